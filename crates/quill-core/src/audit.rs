//! # Audit log store
//!
//! Append-only text store of timestamped operational messages. Each entry is
//! one line, `[YYYY-MM-DD HH:MM:SS] <message>`, in local time.
//!
//! The store may be shared with other tools writing the same file, so every
//! entry is appended with a single open/write/close and never buffered.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local, SubsecRound};
use thiserror::Error;

use quill_config::log_audit_debug;

/// strftime pattern for the bracketed timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("failed to append to log store {}: {source}", .path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, AuditError>;

/// Literal prefix identifying what a log line records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// A write request was received
    Input,
    /// A write completed
    Success,
    /// A write or invocation failed
    Error,
    /// Informational note
    Info,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Input => "[INPUT]",
            Tag::Success => "[SUCCESS]",
            Tag::Error => "[ERROR]",
            Tag::Info => "[INFO]",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable line of the log store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    timestamp: DateTime<Local>,
    message: String,
}

impl LogEntry {
    /// Entry stamped with the current wall-clock time
    pub fn now(message: impl Into<String>) -> Self {
        Self::at(Local::now(), message)
    }

    /// Entry stamped with `timestamp`, truncated to whole seconds
    pub fn at(timestamp: DateTime<Local>, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            message: message.into(),
        }
    }

    /// Entry whose message is `<tag> <text>`
    pub fn tagged(tag: Tag, text: &str) -> Self {
        Self::now(format!("{tag} {text}"))
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The exact bytes appended to the store, newline included
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.message
        )
    }
}

/// Destination for audit entries.
///
/// Implementations must preserve the order in which entries are recorded.
pub trait AuditSink: Send + Sync {
    /// Append one entry
    fn record(&self, entry: &LogEntry) -> Result<()>;

    /// Append `<tag> <text>` stamped with the current time
    fn log(&self, tag: Tag, text: &str) -> Result<()> {
        self.record(&LogEntry::tagged(tag, text))
    }
}

/// Log store backed by a text file opened in append mode per entry
#[derive(Debug, Clone)]
pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for FileAuditLog {
    fn record(&self, entry: &LogEntry) -> Result<()> {
        let append_err = |source| AuditError::Append {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(append_err)?;
        // One write per line keeps concurrent appenders from splitting entries
        file.write_all(entry.to_line().as_bytes()).map_err(append_err)?;

        log_audit_debug!(
            "Appended entry",
            store = tracing::field::display(self.path.display()),
            entry = entry.message(),
        );
        Ok(())
    }
}

/// In-process log store, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, entry: &LogEntry) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry.clone());
        Ok(())
    }
}
