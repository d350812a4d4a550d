//! Testing utilities and mock implementations.
//!
//! The mocks stand in for the native engine and the file system so batch
//! behavior can be exercised without an ffmpeg binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use fluxlura_core::testing::{MockEngine, MockSaver};
//!
//! let engine = MockEngine::new();
//! engine.fail_on("clip.mov", "Invalid data found when processing input").await;
//!
//! let saver = MockSaver::new();
//! // ... run a batch, then download_all(&saver) ...
//! assert_eq!(saver.saved_count().await, 1);
//! ```

mod mock_engine;
mod mock_saver;

pub use mock_engine::{MockEngine, RecordedRun};
pub use mock_saver::{MockSaver, RecordedSave};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::orchestrator::UploadedFile;

    /// An uploaded file with the given name and media type.
    pub fn uploaded(name: &str, media_type: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile::new(name, media_type, bytes.to_vec())
    }

    /// A small PNG upload.
    pub fn png(name: &str) -> UploadedFile {
        uploaded(name, "image/png", b"\x89PNG\r\n\x1a\nfake")
    }

    /// A small QuickTime upload.
    pub fn mov(name: &str) -> UploadedFile {
        uploaded(name, "video/quicktime", b"\0\0\0\x14ftypqt  fake")
    }

    /// A small WAV upload.
    pub fn wav(name: &str) -> UploadedFile {
        uploaded(name, "audio/wav", b"RIFF\0\0\0\0WAVEfake")
    }
}
