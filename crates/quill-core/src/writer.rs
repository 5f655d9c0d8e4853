//! # File writer
//!
//! Writes one piece of content to one destination path, creating missing
//! parent directories first. Every attempt leaves exactly one `[SUCCESS]` or
//! `[ERROR]` entry in the audit log store.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use quill_config::path::parent_to_create;
use quill_config::{log_writer_debug, log_writer_warn};

use crate::audit::{AuditSink, Tag};

/// Why a write request could not be completed.
///
/// The display form is the exact message recorded after the `[ERROR]` tag.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error(
        "Failed to write file {}: cannot create directory {}: {source}",
        .path.display(),
        .dir.display()
    )]
    CreateDir {
        path: PathBuf,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {}: {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {}: content is not valid UTF-8", .path.display())]
    InvalidContent { path: PathBuf },
}

impl WriteError {
    /// Destination the failed request targeted
    pub fn path(&self) -> &Path {
        match self {
            WriteError::CreateDir { path, .. }
            | WriteError::WriteFile { path, .. }
            | WriteError::InvalidContent { path } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, WriteError>;

/// A destination path and the content to place there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub path: PathBuf,
    pub content: String,
}

impl WriteRequest {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Build a request from raw process arguments.
    ///
    /// Content is stored as UTF-8, so anything else is rejected here.
    pub fn from_os(path: impl Into<PathBuf>, content: OsString) -> Result<Self> {
        let path = path.into();
        match content.into_string() {
            Ok(content) => Ok(Self { path, content }),
            Err(_) => Err(WriteError::InvalidContent { path }),
        }
    }
}

/// Outcome of a completed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub path: PathBuf,
    pub bytes_written: usize,
}

impl WriteReceipt {
    /// Human-readable confirmation, without the tag
    pub fn summary(&self) -> String {
        format!("File written: {}", self.path.display())
    }
}

/// Writes requests to disk and records each outcome in the audit log
pub struct FileWriter<'a> {
    audit: &'a dyn AuditSink,
}

impl<'a> FileWriter<'a> {
    pub fn new(audit: &'a dyn AuditSink) -> Self {
        Self { audit }
    }

    /// Write `request.content` to `request.path`, truncating any existing file.
    pub fn write(&self, request: &WriteRequest) -> Result<WriteReceipt> {
        match write_to_disk(&request.path, &request.content) {
            Ok(receipt) => {
                self.record(
                    Tag::Success,
                    &format!("File written successfully: {}", receipt.path.display()),
                );
                Ok(receipt)
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Like [`FileWriter::write`], for content straight from the command line.
    pub fn write_os(&self, path: impl Into<PathBuf>, content: OsString) -> Result<WriteReceipt> {
        match WriteRequest::from_os(path, content) {
            Ok(request) => self.write(&request),
            Err(err) => Err(self.reject(err)),
        }
    }

    fn reject(&self, err: WriteError) -> WriteError {
        self.record(Tag::Error, &err.to_string());
        err
    }

    // Audit failures never change the outcome of the write itself
    fn record(&self, tag: Tag, text: &str) {
        if let Err(err) = self.audit.log(tag, text) {
            log_writer_warn!(
                "Could not record write outcome",
                tag = tag.as_str(),
                error = tracing::field::display(&err),
            );
        }
    }
}

fn write_to_disk(path: &Path, content: &str) -> Result<WriteReceipt> {
    if let Some(dir) = parent_to_create(path) {
        fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
            path: path.to_path_buf(),
            dir: dir.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, content.as_bytes()).map_err(|source| WriteError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;

    log_writer_debug!(
        "Wrote file",
        path = tracing::field::display(path.display()),
        bytes = content.len(),
    );
    Ok(WriteReceipt {
        path: path.to_path_buf(),
        bytes_written: content.len(),
    })
}
