//! Human readable byte sizes.

use thiserror::Error;

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// A negative size was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid input: size cannot be negative ({0})")]
pub struct InvalidSize(pub i64);

/// Formats a byte count with two decimals (`1536` -> `"1.50 KB"`).
pub fn bytes_to_size(bytes: i64) -> Result<String, InvalidSize> {
    bytes_to_size_with(bytes, 2)
}

/// Formats a byte count with the given number of decimals.
///
/// Zero is always rendered as `"0 Bytes"`. Sizes beyond the terabyte range stay in TB.
pub fn bytes_to_size_with(bytes: i64, decimals: usize) -> Result<String, InvalidSize> {
    if bytes < 0 {
        return Err(InvalidSize(bytes));
    }
    if bytes == 0 {
        return Ok("0 Bytes".to_string());
    }

    let bytes = bytes as u64;
    let mut unit = 0;
    let mut threshold: u64 = 1024;
    while unit < UNITS.len() - 1 && bytes >= threshold {
        unit += 1;
        threshold = threshold.saturating_mul(1024);
    }

    let scaled = bytes as f64 / 1024f64.powi(unit as i32);
    Ok(format!("{:.*} {}", decimals, scaled, UNITS[unit]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_size_examples() {
        assert_eq!(bytes_to_size(1536).unwrap(), "1.50 KB");
        assert_eq!(bytes_to_size(0).unwrap(), "0 Bytes");
        assert_eq!(bytes_to_size(-5), Err(InvalidSize(-5)));
    }

    #[test]
    fn test_bytes_to_size_unit_boundaries() {
        assert_eq!(bytes_to_size(1).unwrap(), "1.00 Bytes");
        assert_eq!(bytes_to_size(1023).unwrap(), "1023.00 Bytes");
        assert_eq!(bytes_to_size(1024).unwrap(), "1.00 KB");
        assert_eq!(bytes_to_size(1024 * 1024).unwrap(), "1.00 MB");
        assert_eq!(bytes_to_size(2_097_152).unwrap(), "2.00 MB");
        assert_eq!(bytes_to_size(1024_i64.pow(3)).unwrap(), "1.00 GB");
    }

    #[test]
    fn test_bytes_to_size_clamps_at_terabytes() {
        assert_eq!(bytes_to_size(1024_i64.pow(5)).unwrap(), "1024.00 TB");
    }

    #[test]
    fn test_bytes_to_size_with_precision() {
        assert_eq!(bytes_to_size_with(1536, 0).unwrap(), "2 KB");
        assert_eq!(bytes_to_size_with(1536, 1).unwrap(), "1.5 KB");
    }

    #[test]
    fn test_invalid_size_message() {
        assert!(InvalidSize(-1).to_string().starts_with("Invalid input"));
    }
}
