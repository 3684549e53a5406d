//! # RingBuffer - Fixed-Capacity Circular Byte Store
//!
//! Serial and USB transports hand over data in arbitrarily split chunks. The
//! decoders write every chunk into a fixed-size ring and address frames by
//! wrap-around positions, so a frame that straddles the end of the storage is
//! only materialized (defragmented) once it is complete.
//!
//! Positions are always in `[0, capacity)`. The ring does not track a fill
//! level: the owner keeps its own read and write cursors and asks the ring for
//! wrap-aware distances between them.
//!
//! ## Usage
//!
//! ```rust
//! use emit_rs::framing::RingBuffer;
//!
//! let mut ring = RingBuffer::new(8);
//! let end = ring.write(&[1, 2, 3, 4], 6);
//! assert_eq!(end, 2);
//! assert_eq!(ring.read_length(6, end), 4);
//! assert_eq!(ring.extract_range(6, 4), vec![1, 2, 3, 4]);
//! ```

/// Fixed-capacity circular byte store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingBuffer {
    data: Vec<u8>,
}

impl RingBuffer {
    /// Create a zero-filled ring of `capacity` bytes
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be non-zero");
        Self {
            data: vec![0; capacity],
        }
    }

    /// Wrap existing storage; positions address `data` directly
    #[cfg(test)]
    pub(crate) fn from_vec(data: Vec<u8>) -> Self {
        assert!(!data.is_empty(), "ring buffer capacity must be non-zero");
        Self { data }
    }

    /// Number of bytes the ring can hold
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Raw storage, in storage order (not logical order)
    #[cfg(test)]
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Byte at `position`, which wraps around the capacity
    pub fn get(&self, position: usize) -> u8 {
        self.data[position % self.data.len()]
    }

    /// `position` moved forward by `offset`, wrapped
    pub fn advance(&self, position: usize, offset: usize) -> usize {
        (position + offset) % self.data.len()
    }

    /// `position` moved back by `offset`, wrapped
    pub fn retreat(&self, position: usize, offset: usize) -> usize {
        let capacity = self.data.len();
        (position + capacity - offset % capacity) % capacity
    }

    /// Copy `data` into the ring starting at `at`, splitting the copy when it
    /// passes the end of the storage.
    ///
    /// Returns the position following the written bytes. Writing more than
    /// `capacity` bytes in one call overwrites the earliest of them.
    pub fn write(&mut self, data: &[u8], at: usize) -> usize {
        let capacity = self.data.len();
        let at = at % capacity;
        // Only the last `capacity` bytes survive an oversized write.
        let skipped = data.len().saturating_sub(capacity);
        let data = &data[skipped..];
        let at = (at + skipped) % capacity;

        let first = data.len().min(capacity - at);
        self.data[at..at + first].copy_from_slice(&data[..first]);
        let rest = &data[first..];
        self.data[..rest.len()].copy_from_slice(rest);

        (at + data.len()) % capacity
    }

    /// Wrap-aware distance from `start` (inclusive) to `stop` (exclusive)
    pub fn read_length(&self, start: usize, stop: usize) -> usize {
        read_length(self.data.len(), start, stop)
    }

    /// Materialize `length` logical bytes starting at `start`, joining the
    /// tail and head segments when the range wraps.
    pub fn extract_range(&self, start: usize, length: usize) -> Vec<u8> {
        let capacity = self.data.len();
        let start = start % capacity;
        let length = length.min(capacity);

        if start + length <= capacity {
            return self.data[start..start + length].to_vec();
        }

        let mut range = Vec::with_capacity(length);
        range.extend_from_slice(&self.data[start..]);
        range.extend_from_slice(&self.data[..start + length - capacity]);
        range
    }
}

/// Wrap-aware number of bytes from `start` (inclusive) to `stop` (exclusive)
/// in a ring of `capacity` bytes.
pub fn read_length(capacity: usize, start: usize, stop: usize) -> usize {
    if start <= stop {
        stop - start
    } else {
        (capacity - start) + stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_at_start() {
        let mut ring = RingBuffer::from_vec(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(ring.write(&[9, 9, 9], 0), 3);
        assert_eq!(ring.as_slice(), &[9, 9, 9, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_write_across_boundary() {
        let mut ring = RingBuffer::from_vec(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(ring.write(&[9, 9, 9], 6), 1);
        assert_eq!(ring.as_slice(), &[9, 2, 3, 4, 5, 6, 9, 9]);
    }

    #[test]
    fn test_write_nothing() {
        let mut ring = RingBuffer::from_vec(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(ring.write(&[], 6), 6);
        assert_eq!(ring.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_write_ending_exactly_at_capacity() {
        let mut ring = RingBuffer::new(4);
        assert_eq!(ring.write(&[1, 2], 2), 0);
        assert_eq!(ring.as_slice(), &[0, 0, 1, 2]);
    }

    #[test]
    fn test_oversized_write_keeps_last_bytes() {
        let mut ring = RingBuffer::new(4);
        let end = ring.write(&[1, 2, 3, 4, 5, 6], 0);
        assert_eq!(end, 2);
        assert_eq!(ring.extract_range(2, 4), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_read_length() {
        assert_eq!(read_length(10, 7, 2), 5);
        assert_eq!(read_length(7, 2, 5), 3);
        assert_eq!(read_length(7, 0, 5), 5);
        assert_eq!(read_length(7, 4, 4), 0);
    }

    #[test]
    fn test_extract_range() {
        let ring = RingBuffer::from_vec(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(ring.extract_range(0, 4), vec![1, 2, 3, 4]);
        assert_eq!(ring.extract_range(6, 4), vec![7, 8, 1, 2]);
        assert!(ring.extract_range(6, 0).is_empty());
    }

    #[test]
    fn test_advance_and_retreat() {
        let ring = RingBuffer::new(10);
        assert_eq!(ring.advance(8, 3), 1);
        assert_eq!(ring.retreat(1, 3), 8);
        assert_eq!(ring.retreat(5, 0), 5);
    }
}
