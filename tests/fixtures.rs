// Shared captures and frame builders for the integration tests
#![allow(dead_code)]

use emit_rs::framing::{FrameDecoder, FrameProtocol};
use emit_rs::payload::sum_mod256;
use emit_rs::util::hex::decode_hex;

/// EMIT 250 card 208560, descrambled
pub const CARD_208560_HEX: &str = "ffffb02e03001b0e00f60000001fa80021d401319003812704ae9806797c07806808ad830978980a306a0b34b50b20b00c33290d35b30d6f280e709a0eafaf0efa710ffa741efa311bfaad26fa7c44fa0100fa0753fa0000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000456d6974204550542056342e32302020203aff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00ff00d9";

/// EMIT 250 card 206853, descrambled
pub const CARD_206853_HEX: &str = "ffff05280300170e00ab000000651702664f03700907711e0972f60a74e20b756b0c963b0daf9c0dfac70dfa0000fa4400fa0000fa0300fa2445fab300fac01dfac625fa6e2dfa0000fafa52fa7001000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000456d6974204550542056342e32302020202020202020202020202020202020202020202020202020533030363550303033334c30303332203f";

/// MTR4 status message from MTR 14209
pub const MTR4_STATUS_HEX: &str = "ffffffff37538137130c08133335000000c1a7dff743000000bba7dff7b8a7dff751a7dff74fa7dff74ea7dff7c8a6dff7c3a6dff7a5a6dff7d700";

pub fn bytes(hex: &str) -> Vec<u8> {
    decode_hex(hex).unwrap()
}

pub fn card_208560() -> Vec<u8> {
    bytes(CARD_208560_HEX)
}

pub fn card_206853() -> Vec<u8> {
    bytes(CARD_206853_HEX)
}

pub fn mtr4_status() -> Vec<u8> {
    bytes(MTR4_STATUS_HEX)
}

/// Put descrambled EMIT 250 bytes back into their on-the-wire form
pub fn scramble250(frame: &[u8]) -> Vec<u8> {
    frame.iter().map(|b| b ^ 0xDF).collect()
}

/// An MTR4 e-card package carrying the card of an EMIT 250 frame.
///
/// The package number has a zero low byte, so the battery reads OK.
pub fn mtr4_ecard(card250: &[u8], package_number: u32) -> Vec<u8> {
    let mut frame = vec![0xFF; 4];
    frame.extend_from_slice(&[230, b'M']);
    frame.extend_from_slice(&14209u16.to_le_bytes());
    frame.extend_from_slice(&[19, 12, 8, 19, 51, 53]);
    frame.extend_from_slice(&500u16.to_le_bytes());
    frame.extend_from_slice(&package_number.to_le_bytes());
    frame.extend_from_slice(&card250[2..5]);
    frame.extend_from_slice(&[card250[6], card250[7]]);
    let head_check = sum_mod256(&frame[4..25]);
    frame.push(head_check);
    frame.extend_from_slice(&card250[10..160]);
    frame.extend_from_slice(&card250[160..216]);
    let checksum = sum_mod256(&frame);
    frame.push(checksum);
    frame.push(0);
    assert_eq!(frame.len(), 234);
    frame
}

/// Feed `stream` in chunks of `size` bytes and collect every record
pub fn feed_in_chunks<P: FrameProtocol>(
    decoder: &mut FrameDecoder<P>,
    stream: &[u8],
    size: usize,
) -> Vec<P::Record> {
    let mut records = Vec::new();
    for chunk in stream.chunks(size.max(1)) {
        decoder.add_chunk(chunk);
        records.extend(decoder.records());
    }
    records
}

/// Feed `stream` one byte at a time
pub fn feed_bytewise<P: FrameProtocol>(decoder: &mut FrameDecoder<P>, stream: &[u8]) -> Vec<P::Record> {
    feed_in_chunks(decoder, stream, 1)
}
