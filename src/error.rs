//! # Error Handling
//!
//! This module defines the error types of the emit-rs crate. The streaming
//! decoders themselves never fail: corrupt frames are flagged or discarded and
//! decoding continues. Errors are surfaced by the field decoders (and logged by
//! the engine), by the async transport adapter and by the CLI.

use crate::util::hex::HexError;
use thiserror::Error;

/// Errors raised while decoding the fields of a complete frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// More than four bytes were handed to the little-endian integer decoder.
    #[error("Integer field too wide: {len} bytes (at most 4)")]
    IntegerTooWide { len: usize },

    /// A frame or field was shorter than its fixed layout.
    #[error("Truncated frame: needed {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    /// Indicates a nom parsing error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The frame type byte did not match any known frame.
    #[error("Unknown frame type: 0x{0:02X}")]
    UnknownFrameType(u8),
}

impl<'a> From<nom::Err<nom::error::Error<&'a [u8]>>> for DecodeError {
    fn from(e: nom::Err<nom::error::Error<&'a [u8]>>) -> Self {
        match e {
            nom::Err::Incomplete(_) => DecodeError::Parse("incomplete input".into()),
            nom::Err::Error(e) | nom::Err::Failure(e) => DecodeError::Parse(format!(
                "{:?} with {} bytes left",
                e.code,
                e.input.len()
            )),
        }
    }
}

/// Represents the different error types that can occur around the decoders.
#[derive(Debug, Error)]
pub enum EmitError {
    /// Field decoding failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Reading from the transport failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A hex capture could not be decoded.
    #[error("Invalid hex input: {0}")]
    Hex(#[from] HexError),

    /// Indicates an error related to the serial port communication.
    #[error("Serial port error: {0}")]
    SerialPort(String),

    /// The receiving side of a record channel was dropped.
    #[error("Record channel closed")]
    ChannelClosed,
}

impl From<tokio_serial::Error> for EmitError {
    fn from(e: tokio_serial::Error) -> Self {
        EmitError::SerialPort(e.to_string())
    }
}
