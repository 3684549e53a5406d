//! # emit-rs - Streaming Decoders for EMIT Punch-Card Hardware
//!
//! The emit-rs crate decodes the binary telemetry of orienteering punch-card
//! hardware as it arrives from a serial line or USB endpoint. Bytes may be
//! delivered in chunks of any size, down to single bytes; the decoders find
//! frame boundaries in a ring buffer, validate checksums and emit structured
//! records as soon as each frame is complete.
//!
//! ## Features
//!
//! - EMIT 250 readers: descrambling, 217-byte e-card frames, optional early
//!   metadata emission
//! - MTR4: status and e-card packages, stored checksums
//! - eScan/ECU: STX/ETX delimited text frames
//! - Resynchronisation after corrupt or truncated input, with rate-limited
//!   warnings through the `log` facade
//! - An async adapter for any `tokio::io::AsyncRead` and serial line settings
//!   for `tokio-serial`
//!
//! ## Usage
//!
//! ```rust
//! use emit_rs::{Emit250Decoder, Ecard250};
//!
//! let mut decoder = Emit250Decoder::emit250(false);
//! decoder.add_chunk(&[0x20, 0x20]); // a preamble, still scrambled
//! let cards: Vec<Ecard250> = decoder.records().collect();
//! assert!(cards.is_empty());
//! ```

pub mod constants;
pub mod error;
pub mod framing;
pub mod logging;
pub mod payload;
pub mod protocol;
pub mod serial;
pub mod stream;
pub mod util;

pub use crate::error::{DecodeError, EmitError};
pub use crate::logging::{init_logger, log_debug, log_error, log_info, log_warn, try_init_logger};

// Streaming engine
pub use framing::{DecoderStats, FrameDecoder, FrameProtocol, FrameSize, FrameState, RingBuffer};

// Records shared by the e-card layouts
pub use payload::{ControlPunch, DeviceTime};

// Device families
pub use protocol::{
    BatteryStatus, DumpTagFrame, Ecard250, Emit250, Emit250Decoder, Escan, EscanDecoder,
    EscanFrame, Mtr4, Mtr4Decoder, MtrEcard, MtrMessage, MtrStatus, UsbStatusFrame,
};

pub use serial::SerialSettings;
pub use stream::pump;
