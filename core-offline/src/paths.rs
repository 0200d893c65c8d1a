//! Mapping between absolute request URLs and Resource Table paths.
//!
//! Two mappings exist on purpose. Cache keys are mapped with [`stored_path`],
//! which keeps query strings, so a `?v=` variant stored by a page never matches
//! a table entry and is evicted on the next activation. Incoming requests are
//! mapped with [`request_path`], which drops a version suffix before lookup.

/// Logical path of the root document.
pub const ROOT_PATH: &str = "/";

const VERSION_QUERY: &str = "?v=";

/// Absolute URL a Resource Table path is fetched from and stored under.
///
/// ```
/// use core_offline::paths::resource_url;
///
/// assert_eq!(resource_url("https://app.test", "/"), "https://app.test/");
/// assert_eq!(resource_url("https://app.test", "icons/a.png"), "https://app.test/icons/a.png");
/// ```
pub fn resource_url(origin: &str, path: &str) -> String {
    format!("{}/{}", origin, path.trim_start_matches('/'))
}

/// Remainder of `url` after `origin`, or `None` for another origin.
///
/// `https://app.test` must not claim `https://app.test.example/...`.
fn relative_to_origin<'a>(origin: &str, url: &'a str) -> Option<&'a str> {
    let rest = url.strip_prefix(origin)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix('/')
}

/// Logical path of a cached entry's URL. An empty relative path is the root.
pub fn stored_path(origin: &str, url: &str) -> Option<String> {
    let rest = relative_to_origin(origin, url)?;
    Some(if rest.is_empty() {
        ROOT_PATH.to_string()
    } else {
        rest.to_string()
    })
}

/// Logical path an intercepted request resolves to.
///
/// Strips everything from the first `?v=`; the bare origin, `origin/#...` and
/// an empty relative path all resolve to the root. Requests to other origins
/// resolve to `None` and are never intercepted.
pub fn request_path(origin: &str, url: &str) -> Option<String> {
    if url == origin || url.starts_with(&format!("{}/#", origin)) {
        return Some(ROOT_PATH.to_string());
    }

    let rest = relative_to_origin(origin, url)?;
    let key = rest.split(VERSION_QUERY).next().unwrap_or(rest);
    Some(if key.is_empty() {
        ROOT_PATH.to_string()
    } else {
        key.to_string()
    })
}
