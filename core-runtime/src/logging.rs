//! # Logging & Tracing Infrastructure
//!
//! Provides structured logging with the `tracing` crate, supporting:
//! - JSON, pretty and compact output formats
//! - Module-level filtering
//! - URL and path redaction
//! - Integration with host logging via `LoggerSink`
//!
//! ## Overview
//!
//! [`init_logging`] installs a `tracing-subscriber` registry with an
//! `EnvFilter`, one fmt layer, and a layer that mirrors every event surviving
//! the filter into the configured [`LoggerSink`]. When redaction is enabled,
//! fields named like URLs are reduced to scheme, host and path before they
//! reach the sink.
//!
//! Mirrored entries go through a bounded queue drained by one forwarder
//! thread, so the sink sees them in emission order. When the queue is full
//! entries are dropped, and the next delivered entry carries the count in a
//! `sink_dropped` field.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::time::{ConsoleLogger, LogLevel};
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use std::sync::Arc;
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Compact)
//!     .with_level(LogLevel::Debug)
//!     .with_logger_sink(Arc::new(ConsoleLogger::default()));
//!
//! init_logging(config)?;
//! tracing::info!("Large file handler ready");
//! ```

use crate::error::{Error, Result};
use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};
use core_async::runtime;
use core_async::sync::mpsc;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::format::FmtSpan,
    layer::{Context, Layered, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer, Registry,
};

/// Crates whose targets follow the configured level in the default filter.
const WORKSPACE_TARGETS: &[&str] = &[
    "large_file_handler",
    "core_runtime",
    "core_transfer",
    "core_service",
    "bridge_desktop",
];

/// Entries buffered between the logging layer and the host sink.
pub const SINK_QUEUE_CAPACITY: usize = 1024;

/// Field added to the first entry delivered after an overflow.
pub const SINK_DROPPED_FIELD: &str = "sink_dropped";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Minimum log level
    pub level: LogLevel,
    /// Redact URL-like fields before they reach the host sink
    pub redact_urls: bool,
    /// Custom filter string (e.g., "core_transfer=trace,reqwest=debug")
    pub filter: Option<String>,
    /// Optional logger sink for forwarding logs to host
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    /// Log span open/close events
    pub enable_spans: bool,
    pub display_target: bool,
    pub display_thread_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            redact_urls: true,
            filter: None,
            logger_sink: None,
            enable_spans: true,
            display_target: true,
            display_thread_info: false,
        }
    }
}

impl fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("redact_urls", &self.redact_urls)
            .field("filter", &self.filter)
            .field("has_logger_sink", &self.logger_sink.is_some())
            .finish()
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_url_redaction(mut self, redact: bool) -> Self {
        self.redact_urls = redact;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn with_spans(mut self, enable: bool) -> Self {
        self.enable_spans = enable;
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    pub fn with_thread_info(mut self, display: bool) -> Self {
        self.display_thread_info = display;
        self
    }
}

/// Initialize the logging system
///
/// Call once during startup. Subsequent calls return [`Error::Config`].
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;
    let fmt_layer = build_fmt_layer(&config);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(LoggerSinkLayer::new(
            config.logger_sink.clone(),
            config.redact_urls,
            SINK_QUEUE_CAPACITY,
        )?)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let filter_string = match &config.filter {
        Some(custom) => custom.clone(),
        None => {
            let level = level_directive(config.level);
            let mut directives: Vec<String> = WORKSPACE_TARGETS
                .iter()
                .map(|target| format!("{target}={level}"))
                .collect();
            directives.extend(["h2=warn", "hyper=warn", "reqwest=warn"].map(String::from));
            directives.join(",")
        }
    };

    EnvFilter::try_new(filter_string)
        .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
}

type FmtLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

fn build_fmt_layer(config: &LoggingConfig) -> FmtLayer {
    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(config.display_target)
            .with_thread_ids(config.display_thread_info)
            .with_thread_names(config.display_thread_info)
            .with_span_events(span_events)
            .with_writer(io::stdout)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(config.enable_spans)
            .with_span_list(config.enable_spans)
            .with_target(config.display_target)
            .with_thread_ids(config.display_thread_info)
            .with_thread_names(config.display_thread_info)
            .with_writer(io::stdout)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(config.display_target)
            .with_thread_ids(config.display_thread_info)
            .with_thread_names(config.display_thread_info)
            .with_span_events(span_events)
            .with_writer(io::stdout)
            .boxed(),
    }
}

/// Ordered, bounded hand-off from the logging layer to a host sink.
///
/// A dedicated thread owns the sink and awaits each `log` call before taking
/// the next entry. `forward` never blocks the emitting thread.
struct SinkForwarder {
    tx: mpsc::Sender<LogEntry>,
    dropped: AtomicU64,
}

impl SinkForwarder {
    fn spawn(sink: Arc<dyn LoggerSink>, capacity: usize) -> Result<Self> {
        let (tx, mut rx) = mpsc::channel::<LogEntry>(capacity);

        thread::Builder::new()
            .name("lfh-log-sink".to_string())
            .spawn(move || {
                let drained = runtime::block_on(async move {
                    while let Some(entry) = rx.recv().await {
                        if let Err(err) = sink.log(entry).await {
                            eprintln!("LoggerSink error: {}", err);
                        }
                    }
                    if let Err(err) = sink.flush().await {
                        eprintln!("LoggerSink flush error: {}", err);
                    }
                });
                if let Err(err) = drained {
                    eprintln!("LoggerSink forwarder failed to start: {}", err);
                }
            })
            .map_err(|e| Error::Internal(format!("Failed to start log forwarder: {}", e)))?;

        Ok(Self {
            tx,
            dropped: AtomicU64::new(0),
        })
    }

    fn forward(&self, mut entry: LogEntry) {
        let missed = self.dropped.swap(0, Ordering::Relaxed);
        if missed > 0 {
            entry = entry.with_field(SINK_DROPPED_FIELD, missed.to_string());
        }

        if self.tx.try_send(entry).is_err() {
            self.dropped.fetch_add(missed + 1, Ordering::Relaxed);
        }
    }
}

/// Layer that forwards events to a `LoggerSink` implementation.
struct LoggerSinkLayer {
    forwarder: Option<SinkForwarder>,
    min_level: LogLevel,
    redact_urls: bool,
}

impl LoggerSinkLayer {
    fn new(
        sink: Option<Arc<dyn LoggerSink>>,
        redact_urls: bool,
        capacity: usize,
    ) -> Result<Self> {
        let min_level = sink.as_ref().map_or(LogLevel::Info, |s| s.min_level());
        let forwarder = sink
            .map(|sink| SinkForwarder::spawn(sink, capacity))
            .transpose()?;

        Ok(Self {
            forwarder,
            min_level,
            redact_urls,
        })
    }
}

impl<S> Layer<S> for LoggerSinkLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let Some(forwarder) = self.forwarder.as_ref() else {
            return;
        };

        let metadata = event.metadata();
        let level = tracing_level_to_log_level(*metadata.level());
        if level < self.min_level {
            return;
        }

        let mut visitor = SinkVisitor::default();
        event.record(&mut visitor);

        let message = visitor
            .message
            .unwrap_or_else(|| metadata.name().to_string());
        let mut entry = LogEntry::new(level, metadata.target(), message);

        for (key, value) in visitor.fields {
            let value = if self.redact_urls {
                redact_if_sensitive(&key, &value)
            } else {
                value
            };
            entry = entry.with_field(key, value);
        }

        if let Some(span) = ctx.lookup_current() {
            entry.span_id = Some(span.name().to_string());
        }

        forwarder.forward(entry);
    }
}

#[derive(Default)]
struct SinkVisitor {
    message: Option<String>,
    fields: BTreeMap<String, String>,
}

impl SinkVisitor {
    fn record_value(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for SinkVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record_value(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, format!("{:?}", value));
    }
}

fn tracing_level_to_log_level(level: tracing::Level) -> LogLevel {
    match level {
        tracing::Level::TRACE => LogLevel::Trace,
        tracing::Level::DEBUG => LogLevel::Debug,
        tracing::Level::INFO => LogLevel::Info,
        tracing::Level::WARN => LogLevel::Warn,
        tracing::Level::ERROR => LogLevel::Error,
    }
}

/// Reduce a URL to `scheme://host[:port]/path`.
///
/// Query strings, fragments and credentials often carry signed tokens, so
/// they never appear in logs. Unparseable input is replaced entirely.
///
/// ```
/// use core_runtime::logging::redact_url;
///
/// assert_eq!(
///     redact_url("https://user:pw@cdn.example.com/model.bin?sig=abc#x"),
///     "https://cdn.example.com/model.bin"
/// );
/// ```
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();
            format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
        }
        Err(_) => "[INVALID URL]".to_string(),
    }
}

/// Redact a field value based on its name.
///
/// Credentials are dropped entirely and URL-like fields go through
/// [`redact_url`]; everything else passes through.
///
/// ```ignore
/// use core_runtime::logging::redact_if_sensitive;
///
/// info!(url = %redact_if_sensitive("url", &request_url), "Downloading");
/// ```
pub fn redact_if_sensitive(field_name: &str, value: &str) -> String {
    const SECRET_FIELDS: &[&str] = &["token", "password", "secret", "authorization", "cookie"];
    const URL_FIELDS: &[&str] = &["url", "uri", "locator"];

    let field_lower = field_name.to_lowercase();
    if SECRET_FIELDS.iter().any(|f| field_lower.contains(f)) {
        "[REDACTED]".to_string()
    } else if URL_FIELDS.iter().any(|f| field_lower.contains(f)) && value.contains("://") {
        redact_url(value)
    } else {
        value.to_string()
    }
}

/// Strip full file paths to basename only
///
/// ```ignore
/// use core_runtime::logging::strip_path;
///
/// info!(destination = %strip_path("/data/user/0/app/files/model.bin"), "Writing");
/// // Logs: destination="model.bin"
/// ```
pub fn strip_path(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
