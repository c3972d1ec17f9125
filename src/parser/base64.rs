//! Base64 decoding utilities
//!
//! Share links use whichever Base64 alphabet the exporting client happened
//! to pick, with or without padding. This module tries each variant in turn.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use tracing::trace;

// ============================================================================
// Base64 Decoding
// ============================================================================

/// Decodes Base64 content, trying multiple variants
///
/// Attempts to decode the content using:
/// 1. Standard Base64
/// 2. URL-safe Base64
/// 3. Standard/URL-safe without padding
///
/// Whitespace in the input is removed before decoding, and surplus padding
/// is tolerated. Returns `None` when no variant accepts the input.
pub fn decode_base64(content: &str) -> Option<Vec<u8>> {
    // Remove all whitespace (handles line breaks within Base64)
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    trace!(
        "Attempting Base64 decode, cleaned length: {} bytes",
        cleaned.len()
    );

    if cleaned.is_empty() {
        return None;
    }

    if let Ok(decoded) = STANDARD.decode(&cleaned) {
        trace!("Decoded using standard Base64");
        return Some(decoded);
    }

    if let Ok(decoded) = URL_SAFE.decode(&cleaned) {
        trace!("Decoded using URL-safe Base64");
        return Some(decoded);
    }

    let unpadded = cleaned.trim_end_matches('=');
    if let Ok(decoded) = STANDARD_NO_PAD.decode(unpadded) {
        trace!("Decoded using standard Base64 without padding");
        return Some(decoded);
    }
    if let Ok(decoded) = URL_SAFE_NO_PAD.decode(unpadded) {
        trace!("Decoded using URL-safe Base64 without padding");
        return Some(decoded);
    }

    None
}

/// Decodes Base64 content into a UTF-8 string.
pub fn decode_base64_str(content: &str) -> Option<String> {
    decode_base64(content).and_then(|bytes| String::from_utf8(bytes).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_standard() {
        // "hello world"
        assert_eq!(
            decode_base64("aGVsbG8gd29ybGQ="),
            Some(b"hello world".to_vec())
        );
    }

    #[test]
    fn test_decode_missing_padding() {
        assert_eq!(decode_base64("aGVsbG8gd29ybGQ"), Some(b"hello world".to_vec()));
    }

    #[test]
    fn test_decode_url_safe() {
        // bytes 0xfb 0xff encode to "-_8" in the URL-safe alphabet
        assert_eq!(decode_base64("-_8="), Some(vec![0xfb, 0xff]));
        assert_eq!(decode_base64("-_8"), Some(vec![0xfb, 0xff]));
    }

    #[test]
    fn test_decode_with_line_breaks() {
        assert_eq!(
            decode_base64("aGVsbG8g\nd29ybGQ=\r\n"),
            Some(b"hello world".to_vec())
        );
    }

    #[test]
    fn test_decode_invalid_alphabet() {
        assert_eq!(decode_base64("not*base64!"), None);
        assert_eq!(decode_base64(""), None);
    }

    #[test]
    fn test_decode_str_rejects_non_utf8() {
        // 0xff 0xfe is not valid UTF-8
        assert_eq!(decode_base64_str("//4="), None);
        assert_eq!(decode_base64_str("YWVzOnB3"), Some("aes:pw".to_string()));
    }
}
