//! Error types for the download module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving converted files.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Output directory does not exist and could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed { path: PathBuf },

    /// The output name cannot be used as a file name.
    #[error("Invalid output file name: {name}")]
    InvalidName { name: String },

    /// Writing the file failed.
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error during saving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
