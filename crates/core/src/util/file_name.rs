//! File name helpers.

use thiserror::Error;

/// Names longer than this are shortened for display.
pub const MAX_DISPLAY_NAME_LEN: usize = 18;

const ELLIPSIS: &str = "...";

/// The file name was empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid file name")]
pub struct InvalidFileName;

/// Returns the text after the last dot, or an empty string if there is none.
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx + 1..],
        None => "",
    }
}

/// Returns the name without its last extension.
pub fn remove_file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    }
}

/// Shortens a file name for display, keeping its extension.
///
/// `"abcdefghijklmnopqrstuvwxyz.png"` becomes `"abcdefghijkl...opqrstuvwxyz.png"`:
/// the same number of characters is kept from both ends of the stem.
pub fn compress_file_name(file_name: &str) -> Result<String, InvalidFileName> {
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(InvalidFileName);
    }

    if file_name.chars().count() <= MAX_DISPLAY_NAME_LEN {
        return Ok(file_name.to_string());
    }

    let (stem, extension) = match file_name.rfind('.') {
        Some(idx) if idx > 0 => (&file_name[..idx], Some(&file_name[idx + 1..])),
        _ => (file_name, None),
    };

    let extension_len = extension.map(|e| e.chars().count()).unwrap_or(0);
    let stem_chars: Vec<char> = stem.chars().collect();
    let keep = MAX_DISPLAY_NAME_LEN
        .saturating_sub(extension_len + ELLIPSIS.len())
        .min(stem_chars.len());

    let mut compressed: String = stem_chars[..keep].iter().collect();
    compressed.push_str(ELLIPSIS);
    compressed.extend(&stem_chars[stem_chars.len() - keep..]);
    if let Some(extension) = extension {
        compressed.push('.');
        compressed.push_str(extension);
    }

    Ok(compressed)
}
