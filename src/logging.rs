//! Logging configuration and runtime level control for relaychat.
//!
//! The process-wide level starts from configuration and can be changed
//! while the server is running (the `/debug` chat command). Runtime
//! changes go through a [`tracing_subscriber::reload`] handle owned by
//! [`LogControl`], which is in turn owned by the event loop; no other
//! thread ever touches it.

use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, Registry};

/// Diagnostic log level, ordered from quietest to noisiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Errors only (the default).
    Error,
    /// Warnings and errors.
    Warn,
    /// Informational messages, e.g. chat traffic.
    Info,
    /// Everything.
    Debug,
}

impl LogLevel {
    /// Parse a level leniently from a name or the numeric codes 0-3.
    ///
    /// Names are matched case-insensitively. Anything unrecognized is
    /// silently coerced to [`LogLevel::Error`]; callers relying on the
    /// `/debug` command semantics must not report a parse failure.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "error" => LogLevel::Error,
            "1" | "warn" => LogLevel::Warn,
            "2" | "info" => LogLevel::Info,
            "3" | "debug" => LogLevel::Debug,
            _ => LogLevel::Error,
        }
    }

    /// Canonical upper-case name, as used in acknowledgments and log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

type ReloadHandle = reload::Handle<LevelFilter, Registry>;

/// Owner of the mutable process log level.
pub struct LogControl {
    level: LogLevel,
    handle: Option<ReloadHandle>,
}

impl LogControl {
    /// Create a control that tracks a level without a live subscriber.
    ///
    /// Used by tests, which must not install a global subscriber.
    pub fn detached(level: LogLevel) -> Self {
        Self {
            level,
            handle: None,
        }
    }

    /// The currently effective level.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Change the effective level at runtime.
    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
        if let Some(handle) = &self.handle {
            if let Err(e) = handle.reload(LevelFilter::from(level)) {
                warn!("failed to reload log level: {e}");
            }
        }
    }
}

/// Initialize the logging system and return the runtime level control.
///
/// Output goes to stderr with timestamps; stdout stays free for the
/// server console. Calling this twice panics (global subscriber), so the
/// server binary calls it exactly once at startup.
pub fn init(level: LogLevel) -> LogControl {
    let (filter, handle) = reload::Layer::new(LevelFilter::from(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false),
        )
        .init();

    LogControl {
        level,
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_names() {
        assert_eq!(LogLevel::parse_lenient("error"), LogLevel::Error);
        assert_eq!(LogLevel::parse_lenient("ERROR"), LogLevel::Error);
        assert_eq!(LogLevel::parse_lenient("Warn"), LogLevel::Warn);
        assert_eq!(LogLevel::parse_lenient("info"), LogLevel::Info);
        assert_eq!(LogLevel::parse_lenient("DEBUG"), LogLevel::Debug);
    }

    #[test]
    fn test_parse_lenient_numeric() {
        assert_eq!(LogLevel::parse_lenient("0"), LogLevel::Error);
        assert_eq!(LogLevel::parse_lenient("1"), LogLevel::Warn);
        assert_eq!(LogLevel::parse_lenient("2"), LogLevel::Info);
        assert_eq!(LogLevel::parse_lenient("3"), LogLevel::Debug);
    }

    #[test]
    fn test_parse_lenient_unknown_coerces_to_error() {
        assert_eq!(LogLevel::parse_lenient("banana"), LogLevel::Error);
        assert_eq!(LogLevel::parse_lenient(""), LogLevel::Error);
        assert_eq!(LogLevel::parse_lenient("4"), LogLevel::Error);
        assert_eq!(LogLevel::parse_lenient("-1"), LogLevel::Error);
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(LogLevel::Error.as_str(), "ERROR");
        assert_eq!(LogLevel::Warn.as_str(), "WARN");
        assert_eq!(LogLevel::Info.as_str(), "INFO");
        assert_eq!(LogLevel::Debug.as_str(), "DEBUG");
    }

    #[test]
    fn test_detached_control_tracks_level() {
        let mut control = LogControl::detached(LogLevel::Error);
        assert_eq!(control.level(), LogLevel::Error);

        control.set_level(LogLevel::Debug);
        assert_eq!(control.level(), LogLevel::Debug);
    }

    #[test]
    fn test_level_filter_conversion() {
        assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::ERROR);
        assert_eq!(LevelFilter::from(LogLevel::Debug), LevelFilter::DEBUG);
    }
}
