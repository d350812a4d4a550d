use serde::Serialize;

/// Icon shown next to an item, picked from its media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileIcon {
    Video,
    Audio,
    Text,
    Image,
    Generic,
}

impl FileIcon {
    /// Picks the icon for a media type. Checks run in a fixed order, so
    /// `video/*` wins over anything else mentioned in the string.
    pub fn for_media_type(media_type: &str) -> Self {
        if media_type.contains("video") {
            Self::Video
        } else if media_type.contains("audio") {
            Self::Audio
        } else if media_type.contains("text") {
            Self::Text
        } else if media_type.contains("image") {
            Self::Image
        } else {
            Self::Generic
        }
    }

    /// Short glyph for terminal output.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Video => "[vid]",
            Self::Audio => "[aud]",
            Self::Text => "[txt]",
            Self::Image => "[img]",
            Self::Generic => "[file]",
        }
    }
}
