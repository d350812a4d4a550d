//! Types for the batch orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::catalogue::{self, MediaKind};
use crate::download::{DownloadError, SavedFile};
use crate::engine::EngineError;
use crate::invoker::ConvertedFile;
use crate::util::file_extension;

/// Identifies one item for the lifetime of an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle status of an item.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    /// Uploaded, no target chosen.
    Pending,
    /// Target chosen, not yet converted.
    Ready,
    /// Currently in the engine.
    Converting,
    /// Converted; the result can be downloaded.
    Converted { result: ConvertedFile },
    /// Conversion failed. Terminal.
    Errored { message: String },
}

impl ItemStatus {
    /// Short lowercase name, used in errors and logs.
    pub fn state_name(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Ready => "ready",
            ItemStatus::Converting => "converting",
            ItemStatus::Converted { .. } => "converted",
            ItemStatus::Errored { .. } => "errored",
        }
    }

    /// Converted or errored.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Converted { .. } | ItemStatus::Errored { .. })
    }
}

/// One uploaded file tracked through its lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionItem {
    pub id: ItemId,
    pub file_name: String,
    pub size_bytes: u64,
    /// Declared media type (`image/png`).
    pub media_type: String,
    pub source_extension: String,
    /// Category of the declared media type, if it is one the catalogue groups by.
    pub kind: Option<MediaKind>,
    /// Normalized target extension; unset while pending.
    pub target: Option<String>,
    #[serde(flatten)]
    pub status: ItemStatus,
    pub added_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub(crate) data: Arc<[u8]>,
}

impl ConversionItem {
    pub(crate) fn from_upload(id: ItemId, file: UploadedFile) -> Self {
        Self {
            id,
            source_extension: file_extension(&file.name).to_lowercase(),
            kind: MediaKind::from_media_type(&file.media_type),
            file_name: file.name,
            size_bytes: file.size_bytes,
            media_type: file.media_type,
            target: None,
            status: ItemStatus::Pending,
            added_at: Utc::now(),
            started_at: None,
            finished_at: None,
            data: file.data,
        }
    }

    /// The conversion result, when converted.
    pub fn result(&self) -> Option<&ConvertedFile> {
        match &self.status {
            ItemStatus::Converted { result } => Some(result),
            _ => None,
        }
    }

    /// The failure message, when errored.
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Errored { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status, ItemStatus::Ready)
    }

    pub fn is_converting(&self) -> bool {
        matches!(self.status, ItemStatus::Converting)
    }
}

/// A file offered to the upload surface.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    pub media_type: String,
    pub data: Arc<[u8]>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: data.len() as u64,
            media_type: media_type.into(),
            data: Arc::from(data),
        }
    }

    /// Reads a file from disk, declaring its media type from the extension.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", path.display()),
                )
            })?;
        let data = tokio::fs::read(path).await?;
        let media_type = catalogue::media_type_for(file_extension(&name));
        Ok(Self::new(name, media_type, data))
    }
}

/// Result of one upload call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    /// Ids of the accepted files, in upload order.
    pub added: Vec<ItemId>,
    /// Names of the files the accept filter turned away.
    pub rejected: Vec<String>,
}

/// Outcome of a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Items captured at batch start.
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
}

/// A converted item that could not be saved.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadFailure {
    pub id: ItemId,
    pub output_name: String,
    pub message: String,
}

/// Outcome of a download-all.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadReport {
    pub saved: Vec<SavedFile>,
    pub failed: Vec<DownloadFailure>,
}

/// A transient, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

/// Events published by the orchestrator.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    ItemsAdded {
        ids: Vec<ItemId>,
    },
    UploadRejected {
        file_names: Vec<String>,
    },
    TargetSelected {
        id: ItemId,
        target: String,
    },
    ItemRemoved {
        id: ItemId,
    },
    BatchStarted {
        total: usize,
    },
    ItemStarted {
        id: ItemId,
        file_name: String,
    },
    ItemConverted {
        id: ItemId,
        output_name: String,
    },
    ItemFailed {
        id: ItemId,
        file_name: String,
        message: String,
    },
    Progress {
        completed: usize,
        total: usize,
        percent: u8,
    },
    BatchFinished {
        report: BatchReport,
    },
    Reset,
}

impl BatchEvent {
    /// The toast this event raises, if any.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            BatchEvent::UploadRejected { .. } => Some(Notification {
                title: "Error uploading your file(s)".to_string(),
                description: "Allowed Files: Audio, Video and Images.".to_string(),
            }),
            BatchEvent::ItemFailed { message, .. } => Some(Notification {
                title: "Error converting your file".to_string(),
                description: message.clone(),
            }),
            _ => None,
        }
    }
}

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No item with this id.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// Invalid item state for operation.
    #[error("invalid state for item {id}: expected {expected}, got {actual}")]
    InvalidState {
        id: ItemId,
        expected: String,
        actual: String,
    },

    /// Target extension is not in the catalogue.
    #[error("unsupported target format: {0}")]
    UnsupportedTarget(String),

    /// Convert requested while some item has no target, or with no items.
    #[error("every item needs a target format before converting")]
    NotReady,

    /// A batch is already running.
    #[error("a conversion batch is already in progress")]
    BatchInProgress,

    /// The engine could not be initialized; conversions are blocked.
    #[error("engine initialization failed: {0}")]
    EngineInit(#[source] EngineError),

    /// Items are not removable while in the engine.
    #[error("item {0} is being converted")]
    ItemConverting(ItemId),

    /// Download requested for an item without a result.
    #[error("item {0} has not been converted")]
    NotConverted(ItemId),

    /// Saving the result failed.
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),
}

impl OrchestratorError {
    pub(crate) fn invalid_state(id: ItemId, expected: &str, actual: &ItemStatus) -> Self {
        OrchestratorError::InvalidState {
            id,
            expected: expected.to_string(),
            actual: actual.state_name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_from_upload() {
        let file = UploadedFile::new("Photo.PNG", "image/png", vec![0u8; 2_097_152]);
        let item = ConversionItem::from_upload(ItemId::new(1), file);

        assert_eq!(item.file_name, "Photo.PNG");
        assert_eq!(item.size_bytes, 2_097_152);
        assert_eq!(item.source_extension, "png");
        assert_eq!(item.kind, Some(MediaKind::Image));
        assert!(item.target.is_none());
        assert!(matches!(item.status, ItemStatus::Pending));
    }

    #[test]
    fn test_status_names() {
        assert_eq!(ItemStatus::Pending.state_name(), "pending");
        assert_eq!(ItemStatus::Converting.state_name(), "converting");
        assert!(!ItemStatus::Ready.is_terminal());
        assert!(ItemStatus::Errored {
            message: "x".to_string()
        }
        .is_terminal());
    }

    #[test]
    fn test_notifications() {
        let rejected = BatchEvent::UploadRejected {
            file_names: vec!["notes.txt".to_string()],
        };
        let n = rejected.notification().unwrap();
        assert_eq!(n.title, "Error uploading your file(s)");
        assert_eq!(n.description, "Allowed Files: Audio, Video and Images.");

        let failed = BatchEvent::ItemFailed {
            id: ItemId::new(2),
            file_name: "clip.mov".to_string(),
            message: "moov atom not found".to_string(),
        };
        let n = failed.notification().unwrap();
        assert_eq!(n.title, "Error converting your file");
        assert_eq!(n.description, "moov atom not found");

        assert!(BatchEvent::Reset.notification().is_none());
    }

    #[test]
    fn test_event_serialization() {
        let event = BatchEvent::Progress {
            completed: 1,
            total: 2,
            percent: 50,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["percent"], 50);
    }

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::ItemNotFound(ItemId::new(7));
        assert_eq!(err.to_string(), "item not found: #7");

        let err = OrchestratorError::invalid_state(ItemId::new(3), "pending or ready", &ItemStatus::Converting);
        assert_eq!(
            err.to_string(),
            "invalid state for item #3: expected pending or ready, got converting"
        );
    }

    #[tokio::test]
    async fn test_uploaded_file_from_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("song.wav");
        std::fs::write(&path, b"RIFF").unwrap();

        let file = UploadedFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "song.wav");
        assert_eq!(file.size_bytes, 4);
        assert!(file.media_type.starts_with("audio/"));
    }
}
