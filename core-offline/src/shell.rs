//! # Shell Manifest
//!
//! The deployment-time description of the application shell: the Resource
//! Table (path -> content fingerprint) and the Core Set of paths fetched
//! eagerly on install. Both are fixed for the lifetime of one deployed
//! version and are injected into the manager at startup.

use crate::error::{OfflineError, Result};
use crate::paths::ROOT_PATH;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable mapping from logical resource path to content fingerprint.
///
/// Serializes as a flat JSON object, which is also the format of the
/// persisted manifest record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceTable(BTreeMap<String, String>);

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint recorded for `path`.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(path, hash)| (path.as_str(), hash.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ResourceTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(path, hash)| (path.into(), hash.into()))
                .collect(),
        )
    }
}

/// Ordered list of paths required for minimal offline operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoreSet(Vec<String>);

impl CoreSet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CoreSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for CoreSet {
    fn from(paths: Vec<String>) -> Self {
        Self(paths)
    }
}

/// Resource Table plus Core Set for one deployed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellManifest {
    resources: ResourceTable,
    core: CoreSet,
}

impl ShellManifest {
    /// Validate and bundle a table and core set.
    ///
    /// # Errors
    ///
    /// `InvalidShell` when a path is empty or starts with `/` (other than the
    /// root document itself), when a core path is missing from
    /// the table, or when a core path is listed twice.
    pub fn new(resources: ResourceTable, core: CoreSet) -> Result<Self> {
        if resources.paths().any(str::is_empty) {
            return Err(OfflineError::InvalidShell(format!(
                "Resource paths cannot be empty (use \"{}\" for the root document)",
                ROOT_PATH
            )));
        }

        // Requests and stored entries map to origin-relative paths
        if let Some(path) = resources
            .paths()
            .find(|path| *path != ROOT_PATH && path.starts_with('/'))
        {
            return Err(OfflineError::InvalidShell(format!(
                "Resource path '{}' must be relative to the origin",
                path
            )));
        }

        for (index, path) in core.iter().enumerate() {
            if !resources.contains(path) {
                return Err(OfflineError::InvalidShell(format!(
                    "Core path '{}' is not in the resource table",
                    path
                )));
            }
            if core.iter().take(index).any(|earlier| earlier == path) {
                return Err(OfflineError::InvalidShell(format!(
                    "Core path '{}' is listed more than once",
                    path
                )));
            }
        }

        Ok(Self { resources, core })
    }

    /// Build from compiled-in constants.
    pub fn from_static(resources: &[(&str, &str)], core: &[&str]) -> Result<Self> {
        Self::new(
            resources.iter().copied().collect(),
            core.iter().copied().collect(),
        )
    }

    /// Build from the JSON a build step emits: an object of path -> hash and
    /// an array of core paths.
    pub fn from_json(resources: &str, core: &str) -> Result<Self> {
        let resources: ResourceTable = serde_json::from_str(resources)
            .map_err(|e| OfflineError::InvalidShell(format!("Resource table: {}", e)))?;
        let core: CoreSet = serde_json::from_str(core)
            .map_err(|e| OfflineError::InvalidShell(format!("Core set: {}", e)))?;
        Self::new(resources, core)
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn core(&self) -> &CoreSet {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_static_keeps_core_order() {
        let shell = ShellManifest::from_static(
            &[("/", "h0"), ("index.html", "h0"), ("main.dart.js", "h1")],
            &["main.dart.js", "index.html"],
        )
        .unwrap();

        assert_eq!(
            shell.core().iter().collect::<Vec<_>>(),
            vec!["main.dart.js", "index.html"]
        );
        assert_eq!(shell.resources().get("main.dart.js"), Some("h1"));
        assert_eq!(shell.resources().len(), 3);
    }

    #[test]
    fn test_core_path_must_be_in_table() {
        let err = ShellManifest::from_static(&[("a.js", "h1")], &["b.js"]).unwrap_err();
        assert!(matches!(err, OfflineError::InvalidShell(msg) if msg.contains("b.js")));
    }

    #[test]
    fn test_duplicate_core_path_rejected() {
        let err = ShellManifest::from_static(&[("a.js", "h1")], &["a.js", "a.js"]).unwrap_err();
        assert!(matches!(err, OfflineError::InvalidShell(_)));
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(ShellManifest::from_static(&[("", "h1")], &[]).is_err());
    }

    #[test]
    fn test_absolute_path_rejected() {
        let err = ShellManifest::from_static(&[("/", "h0"), ("/a.js", "h1")], &[]).unwrap_err();
        assert!(matches!(err, OfflineError::InvalidShell(msg) if msg.contains("/a.js")));

        assert!(ShellManifest::from_static(&[("/", "h0"), ("a.js", "h1")], &["/"]).is_ok());
    }

    #[test]
    fn test_from_json() {
        let shell = ShellManifest::from_json(
            r#"{"flutter.js": "888483df", "/": "5a28f03a"}"#,
            r#"["flutter.js"]"#,
        )
        .unwrap();
        assert!(shell.resources().contains("/"));
        assert_eq!(shell.core().len(), 1);

        assert!(ShellManifest::from_json("[]", "[]").is_err());
    }

    #[test]
    fn test_table_serializes_as_flat_object() {
        let table: ResourceTable = [("b.js", "h2"), ("a.js", "h1")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&table).unwrap(),
            r#"{"a.js":"h1","b.js":"h2"}"#
        );
    }
}
