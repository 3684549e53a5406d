//! # Frame Boundary Detection
//!
//! Two ways of finding where a frame starts in the unsynchronized stream:
//!
//! - **Preamble** (EMIT 250, MTR4): a run of `preamble_len` consecutive `0xFF`
//!   bytes. The run may be split over two chunks, so the scan also covers the
//!   last `preamble_len - 1` bytes written before the new chunk.
//! - **Markers** (eScan/ECU): single STX/ETX bytes, searched for in the newly
//!   written bytes only.

use crate::constants::PREAMBLE_BYTE;
use crate::framing::ring_buffer::RingBuffer;

/// How a protocol delimits its frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Frames start with `length` consecutive `0xFF` bytes and have a length
    /// determined by their header.
    Preamble { length: usize },
    /// Frames are enclosed by a start and a stop byte.
    Markers { start: u8, stop: u8 },
}

/// Scan for a preamble in the bytes just written to `ring`.
///
/// `write_position` is where the new bytes of length `new_len` were written.
/// The window starts `preamble_len - 1` bytes earlier so a preamble split
/// across chunks is found.
///
/// Returns the position right after the most recent run of at least
/// `preamble_len` `0xFF` bytes, or `None`. When a run is longer than
/// `preamble_len`, only its last `preamble_len` bytes count as the preamble;
/// the earlier ones are padding before the frame.
pub fn scan_preamble(
    ring: &RingBuffer,
    preamble_len: usize,
    write_position: usize,
    new_len: usize,
) -> Option<usize> {
    if preamble_len == 0 {
        return None;
    }

    let lookback = preamble_len - 1;
    let window = (new_len + lookback).min(ring.capacity());
    let end = ring.advance(write_position, new_len);
    let mut position = ring.retreat(end, window);
    let mut run = 0usize;
    let mut found = None;

    for _ in 0..window {
        if ring.get(position) == PREAMBLE_BYTE {
            run += 1;
            if run >= preamble_len {
                found = Some(ring.advance(position, 1));
            }
        } else {
            run = 0;
        }
        position = ring.advance(position, 1);
    }

    found
}

/// Ring position right after the first `marker` byte in `new_bytes`, which
/// were written to a ring of `capacity` bytes at `write_position`.
pub fn find_marker(
    capacity: usize,
    write_position: usize,
    new_bytes: &[u8],
    marker: u8,
) -> Option<usize> {
    new_bytes
        .iter()
        .position(|&byte| byte == marker)
        .map(|index| (write_position + index + 1) % capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::USB_START_BYTE;

    fn ring() -> RingBuffer {
        RingBuffer::from_vec(vec![0xFF, 1, 7, 0xFF, 0xFF, 0xFF, 2, 7, 0xFF, 0xFF])
    }

    #[test]
    fn test_no_preamble() {
        assert_eq!(scan_preamble(&ring(), 3, 6, 4), None);
    }

    #[test]
    fn test_preamble_wrapping_end_of_storage() {
        // run at 8, 9, 0
        assert_eq!(scan_preamble(&ring(), 3, 8, 4), Some(1));
    }

    #[test]
    fn test_preamble_in_lookback() {
        // run at 9, 0; only position 0 is new
        assert_eq!(scan_preamble(&ring(), 2, 0, 1), Some(1));
    }

    #[test]
    fn test_long_run_keeps_trailing_bytes() {
        // run of three at 3, 4, 5; the preamble is 4, 5
        assert_eq!(scan_preamble(&ring(), 2, 2, 4), Some(6));
    }

    #[test]
    fn test_marker_absent() {
        assert_eq!(find_marker(9, 7, &[11, 12, 13], USB_START_BYTE), None);
    }

    #[test]
    fn test_marker_position_wraps() {
        let new_bytes = [0, 7, 9, 8, 7, USB_START_BYTE];
        assert_eq!(find_marker(9, 7, &new_bytes, USB_START_BYTE), Some(4));
    }

    #[test]
    fn test_marker_first_occurrence() {
        let new_bytes = [USB_START_BYTE, 1, USB_START_BYTE];
        assert_eq!(find_marker(100, 10, &new_bytes, USB_START_BYTE), Some(11));
    }
}
