//! Trait definitions for the download module.

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;

use super::error::DownloadError;
use crate::invoker::ConvertedFile;

/// Where a converted file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    /// Output name of the conversion.
    pub output_name: String,
    /// Final location, which may differ from the output name if it was taken.
    pub path: PathBuf,
    /// Bytes written.
    pub size_bytes: u64,
}

/// Saves converted files somewhere the user can reach them.
#[async_trait]
pub trait Saver: Send + Sync {
    /// Returns the name of this saver implementation.
    fn name(&self) -> &str;

    /// Saves one converted file.
    async fn save(&self, file: &ConvertedFile) -> Result<SavedFile, DownloadError>;
}
