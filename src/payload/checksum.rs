//! Mod-256 sum checks used by the EMIT 250 and MTR4 frames.
//!
//! A failed check never rejects a frame. Records carry the outcome as validity
//! flags and the consumer decides what to do with a corrupt reading.

/// Sum of all bytes, modulo 256
pub fn sum_mod256(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}

/// `true` when the bytes sum to `expected` modulo 256
pub fn checksum_matches(bytes: &[u8], expected: u8) -> bool {
    sum_mod256(bytes) == expected
}

/// EMIT 250 style check: the region includes its own check byte and sums to 0
pub fn zero_sum_valid(bytes: &[u8]) -> bool {
    checksum_matches(bytes, 0)
}

/// MTR4 style check: the last byte of `region` is the stored checksum of the
/// bytes before it
pub fn trailing_checksum_valid(region: &[u8]) -> bool {
    match region.split_last() {
        Some((&stored, covered)) => checksum_matches(covered, stored),
        None => false,
    }
}
