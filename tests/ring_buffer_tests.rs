use emit_rs::framing::{find_marker, read_length, scan_preamble, RingBuffer};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_write_then_extract(
        capacity in 1usize..64,
        start in 0usize..64,
        data in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut ring = RingBuffer::new(capacity);
        let start = start % capacity;
        let end = ring.write(&data, start);

        prop_assert_eq!(end, (start + data.len()) % capacity);

        let kept = data.len().min(capacity);
        let from = ring.retreat(end, kept);
        prop_assert_eq!(ring.extract_range(from, kept), data[data.len() - kept..].to_vec());
    }

    #[test]
    fn prop_read_length_inverts_advance(
        capacity in 1usize..512,
        start in 0usize..512,
        len in 0usize..512,
    ) {
        let start = start % capacity;
        let len = len % capacity;
        let ring = RingBuffer::new(capacity);
        prop_assert_eq!(read_length(capacity, start, ring.advance(start, len)), len);
    }

    #[test]
    fn prop_extract_then_rewrite_is_identity(
        data in prop::collection::vec(any::<u8>(), 1..64),
        start in 0usize..64,
        len in 0usize..64,
    ) {
        let mut ring = RingBuffer::new(data.len());
        ring.write(&data, 0);
        let start = start % data.len();
        let len = len % (data.len() + 1);

        let range = ring.extract_range(start, len);
        ring.write(&range, start);
        prop_assert_eq!(ring.extract_range(0, data.len()), data);
    }

    #[test]
    fn prop_preamble_is_preceded_by_run(
        data in prop::collection::vec(prop_oneof![Just(0xFFu8), any::<u8>()], 8..64),
        write_position in 0usize..64,
        new_len in 1usize..16,
        preamble_len in 2usize..5,
    ) {
        let mut ring = RingBuffer::new(data.len());
        ring.write(&data, 0);
        let write_position = write_position % data.len();

        if let Some(end) = scan_preamble(&ring, preamble_len, write_position, new_len) {
            for back in 1..=preamble_len {
                prop_assert_eq!(ring.get(ring.retreat(end, back)), 0xFF);
            }
        }
    }

    #[test]
    fn prop_preamble_found_wherever_it_lands(
        capacity in 8usize..64,
        at in 0usize..64,
        noise in prop::collection::vec(0u8..0xFF, 1..8),
    ) {
        let mut ring = RingBuffer::new(capacity);
        let at = at % capacity;
        let mut chunk = noise.clone();
        chunk.extend_from_slice(&[0xFF, 0xFF]);
        chunk.truncate(capacity);
        prop_assume!(chunk.len() == noise.len() + 2);

        let end = ring.write(&chunk, at);
        prop_assert_eq!(scan_preamble(&ring, 2, at, chunk.len()), Some(end));
    }

    #[test]
    fn prop_marker_position(
        capacity in 2usize..64,
        at in 0usize..64,
        before in prop::collection::vec(4u8..=255, 0..16),
    ) {
        let at = at % capacity;
        let mut bytes = before.clone();
        bytes.push(0x02);
        let expected = (at + before.len() + 1) % capacity;
        prop_assert_eq!(find_marker(capacity, at, &bytes, 0x02), Some(expected));
    }
}

#[test]
fn test_split_preamble_across_chunks() {
    let mut ring = RingBuffer::new(16);
    let end = ring.write(&[0x10, 0x20, 0xFF], 14);
    assert_eq!(scan_preamble(&ring, 2, 14, 3), None);

    let after = ring.write(&[0xFF, 0x30], end);
    assert_eq!(scan_preamble(&ring, 2, end, 2), Some(2));
    assert_eq!(after, 3);
}

#[test]
fn test_four_byte_preamble_split_three_ways() {
    let mut ring = RingBuffer::new(10);
    let mut position = 8;
    let mut found = None;
    for chunk in [&[0x00, 0xFF][..], &[0xFF, 0xFF], &[0xFF, 0x37]] {
        let start = position;
        position = ring.write(chunk, start);
        found = found.or(scan_preamble(&ring, 4, start, chunk.len()));
    }
    // run occupies 9, 0, 1, 2
    assert_eq!(found, Some(3));
}
