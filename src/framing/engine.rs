//! # Streaming Frame Engine
//!
//! [`FrameDecoder`] is the engine shared by the EMIT 250, MTR4 and eScan
//! decoders. It owns the ring buffer and its cursors, runs boundary detection
//! over every chunk, sizes and assembles frames, and queues decoded records
//! for the caller. Protocol specifics live behind the [`FrameProtocol`] trait.
//!
//! Every byte position is stepped individually after a chunk is written, so
//! the decoded records do not depend on how the transport split the stream.
//!
//! ## Usage
//!
//! ```rust
//! use emit_rs::framing::FrameDecoder;
//! use emit_rs::protocol::Mtr4;
//!
//! let mut decoder = FrameDecoder::new(Mtr4::new());
//! decoder.add_chunk(&[0xFF, 0xFF, 0xFF, 0xFF, 0x37, 0x53]);
//! assert!(decoder.next_record().is_none()); // status message not complete yet
//! ```

use std::borrow::Cow;
use std::collections::vec_deque::Drain;
use std::collections::VecDeque;

use log::warn;
use serde::Serialize;

use crate::constants::RING_FRAMES;
use crate::error::DecodeError;
use crate::framing::boundary::{find_marker, scan_preamble, Boundary};
use crate::framing::ring_buffer::{read_length, RingBuffer};
use crate::util::logging::{log_frame_hex, LogThrottle};

/// Frame size as far as it can be resolved from the bytes seen so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSize {
    /// Not enough header bytes to tell
    Pending,
    /// The type byte matches no known frame
    Unknown(u8),
    /// The frame is complete at exactly this many bytes
    Fixed(usize),
    /// The frame ends at a stop marker
    Delimited,
}

/// Read-only view of the frame currently being assembled
#[derive(Debug, Clone, Copy)]
pub struct FrameWindow<'a> {
    ring: &'a RingBuffer,
    start: usize,
    len: usize,
}

impl<'a> FrameWindow<'a> {
    pub fn new(ring: &'a RingBuffer, start: usize, len: usize) -> Self {
        Self { ring, start, len }
    }

    /// Bytes of the frame received so far
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte at `offset` from the frame start, if already received
    pub fn byte(&self, offset: usize) -> Option<u8> {
        (offset < self.len).then(|| self.ring.get(self.start + offset))
    }

    /// The first `len` received bytes (fewer if not yet received)
    pub fn prefix(&self, len: usize) -> Vec<u8> {
        self.ring.extract_range(self.start, len.min(self.len))
    }
}

/// Protocol-specific half of a streaming decoder
pub trait FrameProtocol {
    /// Structured record produced for a frame
    type Record;

    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// How frames are delimited in the stream
    fn boundary(&self) -> Boundary;

    /// Longest frame this protocol produces
    fn max_frame_len(&self) -> usize;

    /// Ring buffer size; several frames so burst writes never clobber the
    /// frame in progress
    fn ring_capacity(&self) -> usize {
        self.max_frame_len() * RING_FRAMES
    }

    /// Byte-wise transform applied to each chunk before it is buffered
    fn filter<'a>(&self, chunk: &'a [u8]) -> Cow<'a, [u8]> {
        Cow::Borrowed(chunk)
    }

    /// A new frame boundary was detected
    fn frame_started(&mut self) {}

    /// Frame type and length from the header bytes received so far
    fn resolve(&self, _window: &FrameWindow<'_>) -> FrameSize {
        FrameSize::Delimited
    }

    /// Optional early record for an incomplete frame
    fn partial(&mut self, _window: &FrameWindow<'_>) -> Option<Self::Record> {
        None
    }

    /// Decode a complete, defragmented frame
    fn decode(&mut self, frame: &[u8]) -> Result<Self::Record, DecodeError>;
}

/// Where the engine stands relative to the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No boundary seen yet
    Idle,
    /// Assembling a frame from `read_position`
    Open,
    /// The last frame was emitted; waiting for the next boundary
    Consumed,
    /// The last frame was dropped; waiting for the next boundary
    Discarded,
}

/// Counters for monitoring a decoder
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecoderStats {
    pub bytes_received: u64,
    pub records_emitted: u64,
    pub frames_discarded: u64,
}

/// Streaming decoder: ring buffer, cursors and record queue around a protocol
pub struct FrameDecoder<P: FrameProtocol> {
    protocol: P,
    ring: RingBuffer,
    read_position: usize,
    write_position: usize,
    state: FrameState,
    queue: VecDeque<P::Record>,
    stats: DecoderStats,
    throttle: LogThrottle,
}

impl<P: FrameProtocol> FrameDecoder<P> {
    pub fn new(protocol: P) -> Self {
        let ring = RingBuffer::new(protocol.ring_capacity());
        Self {
            protocol,
            ring,
            read_position: 0,
            write_position: 0,
            state: FrameState::Idle,
            queue: VecDeque::new(),
            stats: DecoderStats::default(),
            throttle: LogThrottle::default(),
        }
    }

    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    /// Start of the frame in progress
    pub fn read_position(&self) -> usize {
        self.read_position
    }

    /// Where the next byte will be written
    pub fn write_position(&self) -> usize {
        self.write_position
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Records decoded but not yet taken
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Feed raw bytes from the transport. Never fails; any number of records
    /// may become available through [`next_record`](Self::next_record).
    pub fn add_chunk(&mut self, chunk: &[u8]) {
        self.stats.bytes_received += chunk.len() as u64;

        let filtered = self.protocol.filter(chunk);
        let piece_len = self.protocol.max_frame_len().max(1);

        for piece in filtered.chunks(piece_len) {
            let start = self.write_position;
            self.write_position = self.ring.write(piece, start);

            match self.protocol.boundary() {
                Boundary::Preamble { length } => {
                    for offset in 0..piece.len() {
                        let position = self.ring.advance(start, offset);
                        self.step_preamble(length, position);
                    }
                }
                Boundary::Markers { start: open, stop: close } => {
                    self.step_markers(open, close, start, piece);
                }
            }
        }
    }

    /// Next decoded record, in emission order
    pub fn next_record(&mut self) -> Option<P::Record> {
        self.queue.pop_front()
    }

    /// Take all decoded records
    pub fn records(&mut self) -> Drain<'_, P::Record> {
        self.queue.drain(..)
    }

    fn step_preamble(&mut self, preamble_len: usize, position: usize) {
        let after = self.ring.advance(position, 1);

        if let Some(end) = scan_preamble(&self.ring, preamble_len, position, 1) {
            let start = self.ring.retreat(end, preamble_len);
            // A longer 0xFF run only slides the preamble forward by one byte.
            if self.state == FrameState::Open
                && self.ring.read_length(self.read_position, after) > preamble_len + 1
            {
                self.discard("interrupted by a new preamble");
            }
            self.read_position = start;
            self.state = FrameState::Open;
            self.protocol.frame_started();
        }

        if self.state != FrameState::Open {
            return;
        }

        let len = self.ring.read_length(self.read_position, after);
        let window = FrameWindow::new(&self.ring, self.read_position, len);

        match self.protocol.resolve(&window) {
            FrameSize::Fixed(expected) if len == expected => self.complete(expected),
            FrameSize::Fixed(expected) if len > expected => {
                self.discard("longer than its frame type");
            }
            FrameSize::Unknown(tag) => {
                self.discard(&format!("unknown frame type 0x{tag:02X}"));
            }
            _ if len > self.protocol.max_frame_len() => {
                self.discard("no frame type resolved");
            }
            _ => {
                if let Some(record) = self.protocol.partial(&window) {
                    self.stats.records_emitted += 1;
                    self.queue.push_back(record);
                }
            }
        }
    }

    fn step_markers(&mut self, open: u8, close: u8, start: usize, piece: &[u8]) {
        let capacity = self.ring.capacity();
        let mut consumed = 0;

        while consumed < piece.len() {
            let base = self.ring.advance(start, consumed);
            let rest = &piece[consumed..];
            let distance = |marker_end: usize| read_length(capacity, base, marker_end);

            let next_open = find_marker(capacity, base, rest, open);
            let next_close = find_marker(capacity, base, rest, close);
            let (marker_end, opens) = match (next_open, next_close) {
                (Some(o), Some(c)) if distance(o) < distance(c) => (o, true),
                (_, Some(c)) => (c, false),
                (Some(o), None) => (o, true),
                (None, None) => break,
            };
            consumed += distance(marker_end);

            if opens {
                if self.state == FrameState::Open {
                    self.discard("interrupted by a new start marker");
                }
                self.read_position = marker_end;
                self.state = FrameState::Open;
                self.protocol.frame_started();
            } else if self.state == FrameState::Open {
                let len = self.ring.read_length(self.read_position, marker_end);
                // len counts the stop marker itself
                if len > self.protocol.max_frame_len() + 1 {
                    self.discard("no stop marker");
                } else {
                    self.complete(len);
                }
                self.read_position = marker_end;
            }
        }

        if self.state == FrameState::Open
            && self.ring.read_length(self.read_position, self.write_position)
                > self.protocol.max_frame_len()
        {
            self.discard("no stop marker");
        }
    }

    fn complete(&mut self, len: usize) {
        let frame = self.ring.extract_range(self.read_position, len);
        self.state = FrameState::Consumed;

        match self.protocol.decode(&frame) {
            Ok(record) => {
                log_frame_hex(self.protocol.name(), &frame);
                self.stats.records_emitted += 1;
                self.queue.push_back(record);
            }
            Err(e) => {
                self.stats.frames_discarded += 1;
                self.warn_throttled(format_args!("dropping undecodable frame: {e}"));
            }
        }
    }

    fn discard(&mut self, reason: &str) {
        self.state = FrameState::Discarded;
        self.stats.frames_discarded += 1;
        self.warn_throttled(format_args!("discarding partial frame, {reason}"));
    }

    fn warn_throttled(&mut self, detail: std::fmt::Arguments<'_>) {
        let name = self.protocol.name();
        if self.throttle.allow() {
            warn!("{name}: {detail}");
        } else if self.throttle.suppressed() == 1 {
            warn!("{name}: too many discards, suppressing warnings");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Preamble `FF FF`, then a length byte counting the whole frame
    struct LengthPrefixed;

    impl FrameProtocol for LengthPrefixed {
        type Record = Vec<u8>;

        fn name(&self) -> &'static str {
            "test"
        }

        fn boundary(&self) -> Boundary {
            Boundary::Preamble { length: 2 }
        }

        fn max_frame_len(&self) -> usize {
            8
        }

        fn resolve(&self, window: &FrameWindow<'_>) -> FrameSize {
            match window.byte(2) {
                None => FrameSize::Pending,
                Some(0) => FrameSize::Unknown(0),
                Some(len) => FrameSize::Fixed(usize::from(len)),
            }
        }

        fn decode(&mut self, frame: &[u8]) -> Result<Vec<u8>, DecodeError> {
            Ok(frame.to_vec())
        }
    }

    #[test]
    fn test_frame_window() {
        let ring = RingBuffer::from_vec(vec![3, 4, 0, 0, 1, 2]);
        let window = FrameWindow::new(&ring, 4, 4);
        assert_eq!(window.len(), 4);
        assert_eq!(window.byte(2), Some(3));
        assert_eq!(window.byte(4), None);
        assert_eq!(window.prefix(3), vec![1, 2, 3]);
        assert_eq!(window.prefix(10), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_ring_holds_several_frames() {
        let decoder = FrameDecoder::new(LengthPrefixed);
        assert_eq!(decoder.ring().capacity(), 24);
        assert_eq!(decoder.state(), FrameState::Idle);
    }

    #[test]
    fn test_frames_wrap_the_ring() {
        let mut decoder = FrameDecoder::new(LengthPrefixed);
        let frame = [0xFF, 0xFF, 5, 0x10, 0x20];
        for _ in 0..10 {
            decoder.add_chunk(&frame);
        }
        assert_eq!(decoder.pending(), 10);
        assert!(decoder.records().all(|record| record == frame));
        assert_eq!(decoder.stats().bytes_received, 50);
    }

    #[test]
    fn test_longer_run_slides_preamble() {
        let mut decoder = FrameDecoder::new(LengthPrefixed);
        decoder.add_chunk(&[0xFF, 0xFF, 0xFF, 0xFF, 4, 0x42]);
        assert_eq!(decoder.next_record(), Some(vec![0xFF, 0xFF, 4, 0x42]));
        assert_eq!(decoder.stats().frames_discarded, 0);
    }

    #[test]
    fn test_unknown_type_discards() {
        let mut decoder = FrameDecoder::new(LengthPrefixed);
        decoder.add_chunk(&[0xFF, 0xFF, 0, 1, 2]);
        assert_eq!(decoder.state(), FrameState::Discarded);
        assert_eq!(decoder.stats().frames_discarded, 1);

        decoder.add_chunk(&[0xFF, 0xFF, 3]);
        assert_eq!(decoder.next_record(), Some(vec![0xFF, 0xFF, 3]));
    }

    #[test]
    fn test_oversized_length_discards() {
        let mut decoder = FrameDecoder::new(LengthPrefixed);
        decoder.add_chunk(&[0xFF, 0xFF, 200, 1, 2, 3, 4, 5, 6]);
        assert_eq!(decoder.state(), FrameState::Discarded);
        assert!(decoder.next_record().is_none());
    }

    #[test]
    fn test_discard_warnings_are_throttled() {
        let mut decoder = FrameDecoder::new(LengthPrefixed);
        for _ in 0..10 {
            decoder.add_chunk(&[0xFF, 0xFF, 0, 1]);
        }
        assert_eq!(decoder.stats().frames_discarded, 10);
        assert_eq!(decoder.throttle.suppressed(), 5);
    }
}
