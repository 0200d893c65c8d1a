//! Upgrades across worker restarts with on-disk partitions.

mod common;

use bridge_desktop::{FsCacheStorage, HeadlessWorkerHost};
use bridge_traits::cache::{CacheStorage, CacheStore};
use bridge_traits::http::HttpRequest;
use common::{url, ScriptedHttpClient, ORIGIN};
use core_offline::{OfflineCacheManager, ShellManifest};
use core_runtime::config::WorkerConfig;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn worker(root: &Path, http: Arc<ScriptedHttpClient>, shell: ShellManifest) -> OfflineCacheManager {
    let config = WorkerConfig::builder()
        .http_client(http)
        .cache_storage(Arc::new(FsCacheStorage::with_root(root)))
        .worker_host(Arc::new(HeadlessWorkerHost::new(ORIGIN)))
        .build()
        .unwrap();
    OfflineCacheManager::new(config, shell)
}

#[tokio::test]
async fn test_upgrade_after_restart_uses_persisted_manifest() {
    let dir = TempDir::new().unwrap();
    let http = Arc::new(ScriptedHttpClient::default());
    http.serve(url("index.html"), "<html>v1</html>");
    http.serve(url("main.dart.js"), "main v1");
    http.serve(url("flutter.js"), "loader");

    let v1 = ShellManifest::from_static(
        &[("index.html", "i1"), ("main.dart.js", "m1"), ("flutter.js", "f1")],
        &["index.html"],
    )
    .unwrap();
    {
        let manager = worker(dir.path(), http.clone(), v1);
        manager.install().await.unwrap();
        assert!(manager.activate().await.is_success());
        assert_eq!(manager.download_offline().await.unwrap(), 2);
    }

    // New build: only main.dart.js changed
    http.serve(url("index.html"), "<html>v2</html>");
    http.serve(url("main.dart.js"), "main v2");
    let v2 = ShellManifest::from_static(
        &[("index.html", "i2"), ("main.dart.js", "m2"), ("flutter.js", "f1")],
        &["index.html"],
    )
    .unwrap();
    let manager = worker(dir.path(), http.clone(), v2);
    manager.install().await.unwrap();
    assert!(manager.activate().await.is_success());

    let storage = FsCacheStorage::with_root(dir.path());
    let content = storage.open("app-shell-content").await.unwrap();
    let mut keys = content.keys().await.unwrap();
    keys.sort();
    assert_eq!(keys, vec![url("flutter.js"), url("index.html")]);
    assert_eq!(
        content.get(&url("index.html")).await.unwrap().unwrap().body,
        "<html>v2</html>"
    );

    // Evicted entry is repopulated lazily from the new build
    let response = manager
        .handle_fetch(HttpRequest::get(url("main.dart.js")))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.body, "main v2");
    assert!(content.contains(&url("main.dart.js")).await.unwrap());
}
