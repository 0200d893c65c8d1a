//! Page messages: skipWaiting and downloadOffline.

mod common;

use bridge_traits::cache::{CacheStorage, CacheStore};
use bridge_traits::http::HttpResponse;
use common::{url, Harness};
use core_offline::{OfflineError, ShellManifest, WorkerMessage};
use core_runtime::events::{CacheEvent, LifecycleEvent, WorkerEvent};

fn shell() -> ShellManifest {
    ShellManifest::from_static(
        &[
            ("/", "h0"),
            ("main.dart.js", "h1"),
            ("flutter.js", "h2"),
            ("assets/NOTICES", "h3"),
        ],
        &["main.dart.js"],
    )
    .unwrap()
}

async fn installed_and_activated() -> Harness {
    let harness = Harness::new(shell());
    harness.http.serve(url("main.dart.js"), "main");
    harness.manager.install().await.unwrap();
    assert!(harness.manager.activate().await.is_success());
    harness
}

#[tokio::test]
async fn test_skip_waiting_message() {
    let harness = Harness::new(shell());
    let mut events = harness.events.subscribe();

    assert!(harness
        .manager
        .handle_message_payload("skipWaiting")
        .await
        .unwrap());

    assert_eq!(harness.host.skip_waiting_count(), 1);
    assert_eq!(
        events.recv().await.unwrap(),
        WorkerEvent::Lifecycle(LifecycleEvent::SkipWaitingRequested)
    );
}

#[tokio::test]
async fn test_unknown_message_is_ignored() {
    let harness = Harness::new(shell());

    assert!(!harness
        .manager
        .handle_message_payload("reloadEverything")
        .await
        .unwrap());
    assert_eq!(harness.host.skip_waiting_count(), 0);
    assert!(harness.http.requests().is_empty());
}

#[tokio::test]
async fn test_download_offline_fetches_only_missing_entries() {
    let harness = installed_and_activated().await;
    let mut events = harness.events.subscribe();
    harness.http.clear_requests();
    for path in ["/", "flutter.js", "assets/NOTICES"] {
        harness.http.serve(url(path), path);
    }

    harness
        .manager
        .handle_message(WorkerMessage::DownloadOffline)
        .await
        .unwrap();

    let mut requested = harness.http.requested_urls();
    requested.sort();
    assert_eq!(
        requested,
        vec![url("/"), url("assets/NOTICES"), url("flutter.js")]
    );
    assert_eq!(harness.content_keys().await.len(), 4);
    let root = harness.content().get(&url("/")).await.unwrap().unwrap();
    assert_eq!(root.body, "/");
    assert_eq!(
        events.recv().await.unwrap(),
        WorkerEvent::Cache(CacheEvent::OfflineDownloadCompleted { downloaded: 3 })
    );
}

#[tokio::test]
async fn test_download_offline_with_complete_content_is_noop() {
    let harness = installed_and_activated().await;
    for path in ["/", "flutter.js", "assets/NOTICES"] {
        harness.http.serve(url(path), path);
    }
    assert_eq!(harness.manager.download_offline().await.unwrap(), 3);
    harness.http.clear_requests();

    assert_eq!(harness.manager.download_offline().await.unwrap(), 0);
    assert!(harness.http.requests().is_empty());
}

#[tokio::test]
async fn test_download_offline_is_all_or_nothing() {
    let harness = installed_and_activated().await;
    harness.http.serve(url("/"), "root");
    harness.http.serve(url("flutter.js"), "flutter");
    harness
        .http
        .respond(url("assets/NOTICES"), HttpResponse::new(404, "gone"));

    let err = harness.manager.download_offline().await.unwrap_err();

    assert!(matches!(err, OfflineError::BadStatus { status: 404, .. }));
    assert_eq!(harness.content_keys().await, vec![url("main.dart.js")]);
}

#[tokio::test]
async fn test_download_offline_ignores_versioned_keys() {
    let harness = installed_and_activated().await;
    // A `?v=` variant does not count as the table entry being present
    harness
        .storage
        .open("app-shell-content")
        .await
        .unwrap()
        .put(&format!("{}?v=2", url("flutter.js")), HttpResponse::new(200, "v"))
        .await
        .unwrap();
    for path in ["/", "flutter.js", "assets/NOTICES"] {
        harness.http.serve(url(path), path);
    }

    assert_eq!(harness.manager.download_offline().await.unwrap(), 3);
}
