//! Binary sniffing and text decoding for fetched file contents.

use crate::constants::content;

/// Null byte anywhere, or too many control bytes in the leading window.
///
/// Tab, newline, carriage return, vertical tab and form feed are text.
pub fn is_binary(bytes: &[u8]) -> bool {
    if bytes.contains(&0) {
        return true;
    }

    let window = &bytes[..bytes.len().min(content::BINARY_SNIFF_BYTES)];
    if window.is_empty() {
        return false;
    }

    let control = window
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0b | 0x0c))
        .count();
    control as f64 / window.len() as f64 > content::BINARY_CONTROL_RATIO
}

/// Lossy UTF-8 decode; callers check [`is_binary`] first
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
