//! Format catalogue.
//!
//! Static classification of target extensions into image, video and audio groups,
//! and the engine arguments that encode the quality/codec policy for each target.
//!
//! All lookups are pure. Extensions are matched case-insensitively and without a
//! leading dot.
//!
//! # Example
//!
//! ```
//! use fluxlura_core::catalogue::{self, MediaKind};
//!
//! assert_eq!(catalogue::classify("png"), Some(MediaKind::Image));
//! assert_eq!(catalogue::engine_args("mp3"), vec!["-c:a", "libmp3lame", "-b:a", "192k"]);
//! assert!(catalogue::engine_args("mkv").is_empty());
//! ```

mod accept;
mod formats;
mod types;

pub use accept::accepts;
pub use types::{FormatSpec, MediaKind};

use formats::FORMATS;

/// Media type reported for files whose extension the catalogue does not know.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Normalizes a user-supplied extension (`" .JPG "` -> `"jpg"`).
pub fn normalize(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Looks up the catalogue entry for an extension.
pub fn lookup(extension: &str) -> Option<&'static FormatSpec> {
    let extension = normalize(extension);
    FORMATS.iter().find(|f| f.extension == extension)
}

/// Classifies an extension into exactly one media kind.
///
/// Returns `None` for extensions that are not selectable.
pub fn classify(extension: &str) -> Option<MediaKind> {
    lookup(extension).map(|f| f.kind)
}

/// Whether the extension may be chosen as a conversion target.
pub fn is_selectable(extension: &str) -> bool {
    lookup(extension).is_some()
}

/// Returns the engine arguments for a target extension.
///
/// Unknown extensions yield an empty list, which makes the engine pick its own
/// defaults for the output container.
pub fn engine_args(target: &str) -> Vec<String> {
    lookup(target).map(FormatSpec::engine_args).unwrap_or_default()
}

/// Extensions of one kind, in display order.
pub fn extensions(kind: MediaKind) -> impl Iterator<Item = &'static str> {
    FORMATS
        .iter()
        .filter(move |f| f.kind == kind)
        .map(|f| f.extension)
}

/// Every catalogue entry, grouped by kind in display order.
pub fn all() -> &'static [FormatSpec] {
    FORMATS
}

/// Media type for a file extension, falling back to [`UNKNOWN_MEDIA_TYPE`].
pub fn media_type_for(extension: &str) -> &'static str {
    lookup(extension)
        .map(|f| f.media_type)
        .unwrap_or(UNKNOWN_MEDIA_TYPE)
}
