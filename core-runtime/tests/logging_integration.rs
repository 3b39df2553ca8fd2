//! Integration tests for the logging bootstrap.
//!
//! A global subscriber can only be installed once per process, so the whole
//! lifecycle is exercised in a single test.

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::logging::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CollectingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for CollectingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

#[test]
fn test_init_forwards_to_sink_and_rejects_second_init() {
    let sink = Arc::new(CollectingSink::default());

    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_filter("core_playback=debug")
        .with_logger_sink(sink.clone());
    init_logging(config).expect("first init succeeds");

    tracing::info!(target: "core_playback", key = "intro", password = "hunter2", "Playback started");
    tracing::info!(target: "unrelated_crate", "filtered out");

    if std::env::var("RUST_LOG").is_err() {
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Playback started");
        assert_eq!(
            entries[0].fields.get("password"),
            Some(&"[REDACTED]".to_string())
        );
    }

    let second = init_logging(LoggingConfig::default());
    assert!(matches!(second, Err(Error::Config(_))));
}

#[test]
fn test_invalid_filter_is_config_error() {
    if std::env::var("RUST_LOG").is_ok() {
        return;
    }
    let config = LoggingConfig::default().with_filter("core_store=notalevel[");
    assert!(matches!(init_logging(config), Err(Error::Config(_))));
}
