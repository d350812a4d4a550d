//! Types for the format catalogue.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Media class a target extension belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// All kinds, in the order the selection surface shows them.
    pub const ALL: [MediaKind; 3] = [MediaKind::Image, MediaKind::Video, MediaKind::Audio];

    /// Returns the kind as a lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// Classifies a media type string (`image/png`) by its top-level type.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let top = media_type.split('/').next()?.trim();
        top.parse().ok()
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(format!("unknown media kind: {}", other)),
        }
    }
}

/// One entry of the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    /// Extension without the leading dot, lowercase.
    pub extension: &'static str,
    /// Selection group.
    pub kind: MediaKind,
    /// Media type declared for files carrying this extension.
    pub media_type: &'static str,
    /// Engine arguments placed between the input and output names.
    pub args: &'static [&'static str],
}

impl FormatSpec {
    /// Returns the engine arguments as owned strings.
    pub fn engine_args(&self) -> Vec<String> {
        self.args.iter().map(|a| a.to_string()).collect()
    }
}
