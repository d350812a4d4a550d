//! Types for the conversion invoker.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// One conversion to perform.
#[derive(Debug, Clone, Copy)]
pub struct ConversionRequest<'a> {
    /// Original file name, used to derive the output name.
    pub file_name: &'a str,
    /// Declared media type of the source (`image/png`).
    pub media_type: &'a str,
    /// Source bytes.
    pub data: &'a [u8],
    /// Target extension, already normalized.
    pub target: &'a str,
}

/// Converted bytes held in memory, addressable through a local reference.
#[derive(Clone, Serialize)]
pub struct Blob {
    id: Uuid,
    media_type: String,
    #[serde(skip)]
    data: Arc<[u8]>,
    size_bytes: u64,
}

impl Blob {
    /// Wraps bytes under a fresh reference.
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        let size_bytes = data.len() as u64;
        Self {
            id: Uuid::new_v4(),
            media_type: media_type.into(),
            data: Arc::from(data),
            size_bytes,
        }
    }

    /// Local reference string, unique per blob.
    pub fn url(&self) -> String {
        format!("blob:fluxlura/{}", self.id)
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("id", &self.id)
            .field("media_type", &self.media_type)
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertedFile {
    /// Output file name: source stem plus the target extension.
    pub output_name: String,
    /// The produced bytes.
    pub blob: Blob,
    /// Extension of the source file.
    pub source_extension: String,
    /// Extension converted to.
    pub target_extension: String,
    /// Wall time of the engine round trip.
    pub duration_ms: u64,
}
