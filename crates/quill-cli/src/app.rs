//! Invocation flow: validate arguments, record the request, write, report.
//!
//! Everything here is independent of the process environment so it can be
//! driven from unit tests with an in-memory log store and a byte buffer.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use quill_config::{log_cli_debug, log_cli_warn};
use quill_core::{AuditSink, FileWriter, Tag};

/// Usage line, logged and printed after an `[ERROR]` tag
pub const USAGE: &str = "Usage: quill <file_path> <content>";

/// Positional arguments as the user supplied them
#[derive(Debug, Default)]
pub struct Invocation {
    pub path: Option<PathBuf>,
    pub content: Option<OsString>,
    /// Positional arguments past the second, which are ignored
    pub extra: usize,
}

impl Invocation {
    /// Split raw positionals into path, content and the ignored remainder
    pub fn from_args(args: Vec<OsString>) -> Self {
        let mut args = args.into_iter();
        let path = args.next().map(PathBuf::from);
        let content = args.next();
        Self {
            path,
            content,
            extra: args.count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The content reached the destination
    Written,
    /// The write was attempted and failed
    WriteFailed,
    /// Not enough arguments; nothing was attempted
    Usage,
}

impl Outcome {
    /// Process exit status.
    ///
    /// A failed write exits 0 unless `strict` is set, so callers that treat a
    /// logged failure as non-fatal keep working.
    pub fn exit_code(self, strict: bool) -> u8 {
        match self {
            Outcome::Written => 0,
            Outcome::WriteFailed if strict => 1,
            Outcome::WriteFailed => 0,
            Outcome::Usage => 1,
        }
    }
}

/// Run one invocation, printing outcome lines to `out`.
///
/// Only a failure to print is an error; write failures come back as
/// [`Outcome::WriteFailed`].
pub fn run(
    invocation: Invocation,
    audit: &dyn AuditSink,
    out: &mut dyn Write,
) -> io::Result<Outcome> {
    let (path, content) = match (invocation.path, invocation.content) {
        (Some(path), Some(content)) => (path, content),
        _ => {
            record(audit, Tag::Error, USAGE);
            writeln!(out, "{} {}", Tag::Error, USAGE)?;
            return Ok(Outcome::Usage);
        }
    };

    record(audit, Tag::Input, &format!("Writing to file: {}", path.display()));
    if invocation.extra > 0 {
        log_cli_debug!("Ignoring extra arguments", count = invocation.extra);
        record(
            audit,
            Tag::Info,
            &format!("Ignored {} extra argument(s)", invocation.extra),
        );
    }

    match FileWriter::new(audit).write_os(path, content) {
        Ok(receipt) => {
            writeln!(out, "{} {}", Tag::Success, receipt.summary())?;
            Ok(Outcome::Written)
        }
        Err(err) => {
            writeln!(out, "{} {}", Tag::Error, err)?;
            Ok(Outcome::WriteFailed)
        }
    }
}

fn record(audit: &dyn AuditSink, tag: Tag, text: &str) {
    if let Err(err) = audit.log(tag, text) {
        log_cli_warn!(
            "Could not append to log store",
            tag = tag.as_str(),
            error = tracing::field::display(&err),
        );
    }
}
