//! # quill-core
//!
//! Audit log store and file writer behind the `quill` command.
//!
//! The log store is an explicit [`AuditSink`] handed to the [`FileWriter`],
//! so callers (and tests) decide where entries go.

pub mod audit;
pub mod writer;

pub use audit::{AuditError, AuditSink, FileAuditLog, LogEntry, MemoryAuditLog, Tag};
pub use writer::{FileWriter, WriteError, WriteReceipt, WriteRequest};
