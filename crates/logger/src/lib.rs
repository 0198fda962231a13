use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{fmt as subscriber, EnvFilter};

static SINK_INIT: OnceCell<()> = OnceCell::new();

/// Installs the process-wide tracing subscriber. Safe to call more than once;
/// only the first call takes effect.
pub fn init() {
    SINK_INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = subscriber().with_env_filter(filter).finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set global logger");

        info!("burrow logger initialized");
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Destination for request-scoped log lines.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Cloneable logging handle seeded into each request context.
///
/// The default handle forwards to `tracing` events; a suppressed handle
/// exists for tests that exercise failure paths.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn from_sink(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Forwards everything to `tracing` events.
    pub fn tracing() -> Self {
        Self::from_sink(Arc::new(TracingSink))
    }

    /// Discards everything.
    pub fn suppressed() -> Self {
        Self::from_sink(Arc::new(SuppressedSink))
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        self.sink.log(level, message);
    }

    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Logger")
    }
}

struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => trace!("{}", message),
            LogLevel::Debug => debug!("{}", message),
            LogLevel::Info => info!("{}", message),
            LogLevel::Warn => warn!("{}", message),
            LogLevel::Error => error!("{}", message),
        }
    }
}

struct SuppressedSink;

impl LogSink for SuppressedSink {
    fn log(&self, _level: LogLevel, _message: &str) {}
}
