//! Logging and event bus demonstration
//!
//! Run with:
//! ```bash
//! cargo run -p core-runtime --example logging_demo
//! cargo run -p core-runtime --example logging_demo -- json
//! cargo run -p core-runtime --example logging_demo -- compact "core_runtime=trace"
//! ```

use bridge_traits::logging::{ConsoleLogger, LogLevel};
use core_runtime::events::{
    CacheEvent, EventBus, EventSeverity, EventStream, LifecycleEvent, WorkerEvent,
};
use core_runtime::logging::{init_logging, redact_url, LogFormat, LoggingConfig};
use std::env;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Debug)
        .with_logger_sink(Arc::new(ConsoleLogger {
            min_level: LogLevel::Warn,
        }));
    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }
    init_logging(config)?;

    info!(format = ?format, "Logging initialized");

    let bus = EventBus::default();
    let mut warnings = EventStream::new(bus.subscribe())
        .filter(|event| event.severity() >= EventSeverity::Warning);

    async {
        debug!(url = redact_url("https://app.test/main.dart.js?v=7"), "Fetching");
        bus.emit(WorkerEvent::Lifecycle(LifecycleEvent::Installed { core_paths: 3 }))
            .ok();
        warn!(reason = "manifest unreadable", "Resetting caches");
        bus.emit(WorkerEvent::Cache(CacheEvent::Reset {
            reason: "manifest unreadable".to_string(),
        }))
        .ok();
    }
    .instrument(info_span!("activate"))
    .await;

    if let Ok(event) = warnings.recv().await {
        info!(event = event.description(), "Observed warning event");
    }

    Ok(())
}
