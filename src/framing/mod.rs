//! The framing module turns an unsynchronized byte stream into complete
//! frames: a ring buffer, boundary detection, and the engine that sizes,
//! assembles and hands frames to a protocol decoder.

pub mod boundary;
pub mod engine;
pub mod ring_buffer;

pub use boundary::{find_marker, scan_preamble, Boundary};
pub use engine::{DecoderStats, FrameDecoder, FrameProtocol, FrameSize, FrameState, FrameWindow};
pub use ring_buffer::{read_length, RingBuffer};
