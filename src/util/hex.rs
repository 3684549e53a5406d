//! # Hex Encoding/Decoding Utilities
//!
//! Hex helpers used for frame dumps in the logs and for reading hex captures
//! of serial/USB traffic in the CLI and in tests.
//!
//! ## Usage
//!
//! ```rust
//! use emit_rs::util::hex::{encode_hex, decode_hex, format_hex_compact};
//!
//! let data = [0xFF, 0xFF, 0x37, 0x53];
//! assert_eq!(encode_hex(&data), "ffff3753");
//! assert_eq!(decode_hex("ff ff 37 53").unwrap(), data);
//! assert_eq!(format_hex_compact(&data), "ff ff 37 53");
//! ```

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

/// Encode bytes to lowercase hex string
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode hex string to bytes
///
/// Accepts both uppercase and lowercase hex characters.
/// Whitespace is automatically stripped.
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>, HexError> {
    let cleaned: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.is_empty() {
        return Err(HexError::EmptyString);
    }
    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }

    hex::decode(&cleaned).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Parse hex string that may contain separators such as `,`, `:` or `-`
///
/// More lenient than decode_hex, strips all non-hex characters. Capture tools
/// disagree on separators, so the CLI reads `--hex` input through this.
pub fn parse_hex_lenient(input: &str) -> Result<Vec<u8>, HexError> {
    let hex_chars: String = input.chars().filter(|c| c.is_ascii_hexdigit()).collect();

    if hex_chars.is_empty() {
        return Err(HexError::EmptyString);
    }
    if hex_chars.len() % 2 != 0 {
        return Err(HexError::OddLength(hex_chars.len()));
    }

    hex::decode(&hex_chars).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Format hex data for compact display (useful for logs)
///
/// Formats data as "ff ff 37 53" with spaces between bytes.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
