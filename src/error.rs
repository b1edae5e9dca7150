//! Global error handling for repoconsole
//!
//! Only failures on the root of an operation surface through this type.
//! Failures below the root during a recursive walk are captured in the
//! returned data (node `error` fields, skip counters) instead.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::utils::format_bytes;

/// Global error type for repoconsole operations
#[derive(Error, Debug)]
pub enum Error {
    /// Path does not exist
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Path is a directory where a file was expected
    #[error("Path is a directory: {}", .0.display())]
    IsADirectory(PathBuf),

    /// Insufficient permissions to read the path
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// File exceeds the configured size ceiling
    #[error(
        "File too large to view: {} ({}, max {})",
        path.display(),
        format_bytes(*actual),
        format_bytes(*max)
    )]
    TooLarge {
        path: PathBuf,
        actual: u64,
        max: u64,
    },

    /// File content is binary or uses an unsupported encoding
    #[error("File appears to be binary or has unsupported encoding: {}", .0.display())]
    BinaryContent(PathBuf),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all for stat/read failures
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Classify an io error against the path it occurred on.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Error::PermissionDenied(path.to_path_buf()),
            _ => Error::Io(err),
        }
    }
}

/// Specialized Result type for repoconsole operations
pub type Result<T> = std::result::Result<T, Error>;
