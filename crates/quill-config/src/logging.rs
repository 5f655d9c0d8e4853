//! Structured diagnostics for Quill components.
//!
//! Diagnostics go to stderr through `tracing` and are unrelated to the audit
//! log store. Stdout stays reserved for the outcome lines users script against.
//!
//! # Usage
//!
//! ```ignore
//! use quill_config::logging::*;
//!
//! log_cli_debug!("Parsed arguments", extra = 2);
//! log_writer_warn!(
//!     "Audit append failed",
//!     error = tracing::field::display(&err),
//! );
//! ```

/// Log levels for runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map a repeated `-v` count onto a level, starting from `Warn`.
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

// === CLI logging macros ===

#[macro_export]
macro_rules! log_cli_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = "CLI", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_cli_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = "CLI", $($key = $value,)* $msg)
    };
}

// === WRITER logging macros ===

#[macro_export]
macro_rules! log_writer_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = "WRITER", $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_writer_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = "WRITER", $($key = $value,)* $msg)
    };
}

// === AUDIT logging macros ===

#[macro_export]
macro_rules! log_audit_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = "AUDIT", $($key = $value,)* $msg)
    };
}

/// Initialize diagnostics with the given default level.
///
/// `QUILL_LOG` wins over `RUST_LOG`; both win over `level`.
/// Call this once at application startup.
pub fn init_logging(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_env("QUILL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
