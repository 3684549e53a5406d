//! # Utility Modules
//!
//! Hex encoding/decoding for captures and log dumps, and rate-limited
//! logging for decoder diagnostics.

pub mod hex;
pub mod logging;

pub use hex::{decode_hex, encode_hex, format_hex_compact, parse_hex_lenient, HexError};
pub use logging::{log_frame_hex, LogThrottle};
