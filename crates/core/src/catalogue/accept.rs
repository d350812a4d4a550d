//! Upload acceptance filter.

use super::formats::FORMATS;
use super::types::MediaKind;
use crate::util::file_extension;

/// Returns true if a file with this declared media type and name may be uploaded.
///
/// Any `image/*`, `audio/*` or `video/*` media type is accepted. Files whose media
/// type was not recognised are still accepted when the name carries one of the
/// catalogue's image extensions.
pub fn accepts(media_type: &str, file_name: &str) -> bool {
    if MediaKind::from_media_type(media_type).is_some() {
        return true;
    }

    let extension = file_extension(file_name).to_ascii_lowercase();
    !extension.is_empty()
        && extension != "svg"
        && FORMATS
            .iter()
            .any(|f| f.kind == MediaKind::Image && f.extension == extension)
}
