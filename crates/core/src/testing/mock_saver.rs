//! Mock saver for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::download::{DownloadError, SavedFile, Saver};
use crate::invoker::ConvertedFile;

/// A recorded save for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSave {
    /// Output name of the saved conversion.
    pub output_name: String,
    /// Bytes that would have been written.
    pub bytes: Vec<u8>,
    /// Whether the save succeeded.
    pub success: bool,
}

/// Mock implementation of the [`Saver`] trait.
///
/// Nothing touches the disk. Saves are recorded and can be made to fail
/// for particular output names.
#[derive(Debug, Clone, Default)]
pub struct MockSaver {
    saves: Arc<RwLock<Vec<RecordedSave>>>,
    failing: Arc<RwLock<HashSet<String>>>,
}

impl MockSaver {
    /// Create a new mock saver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every save of `output_name`.
    pub async fn fail_on(&self, output_name: &str) {
        self.failing.write().await.insert(output_name.to_string());
    }

    /// Get all recorded saves.
    pub async fn recorded_saves(&self) -> Vec<RecordedSave> {
        self.saves.read().await.clone()
    }

    /// Number of successful saves.
    pub async fn saved_count(&self) -> usize {
        self.saves.read().await.iter().filter(|s| s.success).count()
    }
}

#[async_trait]
impl Saver for MockSaver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn save(&self, file: &ConvertedFile) -> Result<SavedFile, DownloadError> {
        let success = !self.failing.read().await.contains(&file.output_name);
        self.saves.write().await.push(RecordedSave {
            output_name: file.output_name.clone(),
            bytes: file.blob.bytes().to_vec(),
            success,
        });

        if !success {
            return Err(DownloadError::InvalidName {
                name: file.output_name.clone(),
            });
        }

        Ok(SavedFile {
            output_name: file.output_name.clone(),
            path: PathBuf::from("/mock").join(&file.output_name),
            size_bytes: file.blob.len() as u64,
        })
    }
}
