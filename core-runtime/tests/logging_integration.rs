//! Integration tests for the logging system

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::logging::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, redact_url, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for RecordingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Warn
    }
}

// Global subscriber state: keep every init_logging call in this one test.
#[test]
fn test_init_once_and_mirror_to_sink() {
    let sink = Arc::new(RecordingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(sink.clone());

    init_logging(config).unwrap();

    tracing::warn!(target: "core_offline::activate", reason = "corrupt manifest", "Resetting caches");
    tracing::info!(target: "core_offline::install", "Below the sink threshold");

    {
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(entries[0].message, "Resetting caches");
        assert_eq!(
            entries[0].fields.get("reason"),
            Some(&"corrupt manifest".to_string())
        );
    }

    let second = init_logging(LoggingConfig::default());
    assert!(matches!(second, Err(Error::Config(_))));
}

#[test]
fn test_invalid_filter_rejected_before_install() {
    let config = LoggingConfig::default().with_filter("core_offline=[");
    assert!(matches!(init_logging(config), Err(Error::Config(_))));
}

#[test]
fn test_redact_url_keeps_path_only() {
    assert_eq!(
        redact_url("https://app.test/assets/logo.png?v=3#top"),
        "https://app.test/assets/logo.png"
    );
    assert_eq!(redact_url("https://app.test"), "https://app.test");
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}
