//! Time and Logging Abstractions
//!
//! Injectable time source for lifecycle timestamps, and the sink used to
//! forward structured log records to the host's logging pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// Time source trait
///
/// Transfer lifecycle events are stamped through this so tests can pin the
/// clock.
pub trait Clock: Send + Sync {
    /// Get current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Get current Unix timestamp in milliseconds
    fn unix_timestamp_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// System clock implementation using actual system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Module path that produced the record
    pub target: String,
    pub message: String,
    /// Structured fields, ordered by key
    pub fields: BTreeMap<String, String>,
    /// Id of the enclosing tracing span, if any
    pub span_id: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
            span_id: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }
}

/// Logger sink trait
///
/// Forwards structured logs from the core to host logging pipelines
/// (OSLog on iOS, Logcat on Android, stderr on desktop).
///
/// Implementations must not log request URLs verbatim; the core already
/// redacts query strings before records reach the sink.
#[async_trait]
pub trait LoggerSink: Send + Sync {
    /// Forward a log entry to the host logging system
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Flush any buffered logs
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Records below this level are dropped before they reach the sink.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Console logger used on desktop and in tests
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    pub min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    /// Render an entry as a single console line.
    pub fn format_entry(entry: &LogEntry) -> String {
        let mut line = format!(
            "[{}] {} {}: {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.level.as_str(),
            entry.target,
            entry.message
        );
        for (key, value) in &entry.fields {
            line.push_str(&format!(" {key}={value}"));
        }
        line
    }
}

#[async_trait]
impl LoggerSink for ConsoleLogger {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level >= self.min_level {
            eprintln!("{}", Self::format_entry(&entry));
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock() {
        let clock = SystemClock;
        assert!(clock.unix_timestamp_millis() > 0);
    }

    #[test]
    fn test_log_entry_builder() {
        let entry = LogEntry::new(LogLevel::Info, "core_transfer", "transfer completed")
            .with_field("bytes", "2048")
            .with_span_id("span-7");

        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.target, "core_transfer");
        assert_eq!(entry.fields.get("bytes"), Some(&"2048".to_string()));
        assert_eq!(entry.span_id, Some("span-7".to_string()));
    }

    #[test]
    fn test_console_format_includes_sorted_fields() {
        let entry = LogEntry::new(LogLevel::Warn, "core_transfer::engine", "slow write")
            .with_field("path", "big.bin")
            .with_field("bytes", "10");

        let line = ConsoleLogger::format_entry(&entry);
        assert!(line.contains("WARN core_transfer::engine: slow write"));
        assert!(line.ends_with(" bytes=10 path=big.bin"));
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Debug < LogLevel::Info);
    }

    #[tokio::test]
    async fn test_console_logger() {
        let logger = ConsoleLogger::new(LogLevel::Debug);
        let entry = LogEntry::new(LogLevel::Info, "test", "Test log");

        assert!(logger.log(entry).await.is_ok());
        assert_eq!(logger.min_level(), LogLevel::Debug);
    }
}
