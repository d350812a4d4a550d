//! Error types for the engine module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the transcoding engine or its loader.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine binary could not be located.
    #[error("FFmpeg not found at path: {path}")]
    NotFound { path: PathBuf },

    /// Engine could not be initialized. Not retried within the process.
    #[error("Engine initialization failed: {reason}")]
    InitFailed { reason: String },

    /// A conversion was requested before the engine finished loading.
    #[error("Engine is not loaded yet")]
    NotLoaded,

    /// Workspace names must be plain file names.
    #[error("Invalid workspace file name: {name}")]
    InvalidName { name: String },

    /// Writing input bytes into the workspace failed.
    #[error("Failed to stage {name}: {source}")]
    StageFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but reported failure.
    #[error("{reason}")]
    RunFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The engine finished without producing the requested file.
    #[error("Output file not found in engine workspace: {name}")]
    OutputMissing { name: String },

    /// I/O error talking to the engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Creates an initialization error.
    pub fn init_failed(reason: impl Into<String>) -> Self {
        Self::InitFailed {
            reason: reason.into(),
        }
    }

    /// Creates a run failure with optional captured stderr.
    pub fn run_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::RunFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Human readable message including the engine's own diagnostics when present.
    pub fn detailed_message(&self) -> String {
        match self {
            Self::RunFailed {
                reason,
                stderr: Some(stderr),
            } if !stderr.trim().is_empty() => format!("{}: {}", reason, stderr.trim()),
            other => other.to_string(),
        }
    }
}
