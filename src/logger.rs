use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Number of entries kept by the in-memory log buffer
pub const LOG_CAPACITY: usize = 1000;

/// Log level enum for type-safe logging
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// A single captured log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Module that produced the entry, e.g. "manager" or "pipeline"
    pub source: String,
}

/// Fixed-size ring of log entries, oldest overwritten first
struct CircularBuffer {
    buffer: Vec<LogEntry>,
    head: usize,
    capacity: usize,
}

impl CircularBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    fn push(&mut self, item: LogEntry) {
        if self.buffer.len() < self.capacity {
            self.buffer.push(item);
        } else {
            self.buffer[self.head] = item;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Entries in chronological order
    fn to_vec(&self) -> Vec<LogEntry> {
        let mut result = Vec::with_capacity(self.buffer.len());
        result.extend_from_slice(&self.buffer[self.head..]);
        result.extend_from_slice(&self.buffer[..self.head]);
        result
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.head = 0;
    }
}

enum LogCommand {
    Log(LogEntry),
    GetLogs(Sender<Vec<LogEntry>>),
    Clear,
}

/// Non-blocking logger backed by a background buffer thread
pub struct Logger {
    sender: Sender<LogCommand>,
    min_level: AtomicU8,
}

impl Logger {
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));

        std::thread::spawn(move || {
            Self::logger_thread(receiver, capacity.max(1));
        });

        Self {
            sender,
            min_level: AtomicU8::new(LogLevel::Debug as u8),
        }
    }

    fn logger_thread(receiver: Receiver<LogCommand>, capacity: usize) {
        let mut buffer = CircularBuffer::new(capacity);

        for cmd in receiver {
            match cmd {
                LogCommand::Log(entry) => buffer.push(entry),
                LogCommand::GetLogs(response_tx) => {
                    let _ = response_tx.send(buffer.to_vec());
                }
                LogCommand::Clear => buffer.clear(),
            }
        }
    }

    /// Record a message. Drops the entry if the channel is full.
    pub fn log(&self, level: LogLevel, message: &str, source: &str) {
        if (level as u8) < self.min_level.load(Ordering::Relaxed) {
            return;
        }

        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.to_string(),
            source: source.to_string(),
        };

        let _ = self.sender.try_send(LogCommand::Log(entry));
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn min_level(&self) -> LogLevel {
        LogLevel::from_u8(self.min_level.load(Ordering::Relaxed))
    }

    pub fn get_logs(&self) -> Vec<LogEntry> {
        let (response_tx, response_rx) = bounded(1);
        if self.sender.send(LogCommand::GetLogs(response_tx)).is_ok() {
            response_rx.recv().unwrap_or_default()
        } else {
            Vec::new()
        }
    }

    pub fn clear_logs(&self) {
        let _ = self.sender.send(LogCommand::Clear);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

// Global logger instance
lazy_static::lazy_static! {
    pub static ref LOGGER: Logger = Logger::new();
}

/// Install a `tracing` subscriber honoring `RUST_LOG`, falling back to `level`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Log to the in-memory buffer and forward to `tracing`
#[macro_export]
macro_rules! nexus_log {
    ($level:expr, $source:expr, $($arg:tt)*) => {
        {
            use $crate::logger::LogLevel;
            let level: LogLevel = $level;
            let message = format!($($arg)*);
            $crate::logger::LOGGER.log(level, &message, $source);
            match level {
                LogLevel::Error => tracing::error!(source = $source, "{}", message),
                LogLevel::Warn => tracing::warn!(source = $source, "{}", message),
                LogLevel::Info => tracing::info!(source = $source, "{}", message),
                LogLevel::Debug => tracing::debug!(source = $source, "{}", message),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_round_trip_through_str() {
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error] {
            assert_eq!(LogLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn test_circular_buffer_keeps_newest() {
        let mut buffer = CircularBuffer::new(2);
        for i in 0..3 {
            buffer.push(LogEntry {
                timestamp: Utc::now(),
                level: LogLevel::Info,
                message: format!("entry {}", i),
                source: "test".to_string(),
            });
        }

        let messages: Vec<String> = buffer.to_vec().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["entry 1", "entry 2"]);

        buffer.clear();
        assert!(buffer.to_vec().is_empty());
    }

    #[test]
    fn test_logger_collects_entries_in_order() {
        let logger = Logger::with_capacity(16);
        logger.log(LogLevel::Info, "first", "test");
        logger.log(LogLevel::Error, "second", "test");

        let logs = logger.get_logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message, "first");
        assert_eq!(logs[1].level, LogLevel::Error);
    }

    #[test]
    fn test_logger_min_level_filters() {
        let logger = Logger::with_capacity(16);
        logger.set_min_level(LogLevel::Warn);
        assert_eq!(logger.min_level(), LogLevel::Warn);

        logger.log(LogLevel::Info, "dropped", "test");
        logger.log(LogLevel::Warn, "kept", "test");

        let logs = logger.get_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "kept");
    }

    #[test]
    fn test_logger_clear() {
        let logger = Logger::with_capacity(16);
        logger.log(LogLevel::Info, "entry", "test");
        logger.clear_logs();
        assert!(logger.get_logs().is_empty());
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(LogLevel::Warn);
        init_tracing(LogLevel::Debug);
        nexus_log!(LogLevel::Warn, "test", "after init {}", 1);
    }
}
