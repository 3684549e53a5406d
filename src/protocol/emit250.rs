//! # EMIT 250 Reader Protocol
//!
//! The EMIT 250 (EKT 250) reader sends one 217-byte frame per e-card read,
//! starting with a two-byte `0xFF` preamble. The serial line is scrambled:
//! every byte is XORed with `255 - 32`, which the decoder undoes before
//! buffering.
//!
//! Frame layout (offsets include the preamble):
//!
//! | Offset  | Len | Field                                   |
//! |---------|-----|-----------------------------------------|
//! | 0       | 2   | preamble `FF FF`                        |
//! | 2       | 3   | e-card number, little endian            |
//! | 6       | 1   | production week                         |
//! | 7       | 1   | production year                         |
//! | 2..10   | 8   | head check region, sums to 0 mod 256     |
//! | 10      | 150 | control punches, 3 bytes each           |
//! | 160     | 32  | emit time system string                 |
//! | 192     | 24  | three 8-byte display lines              |
//! | 0..217  | 217 | transfer check region, sums to 0 mod 256 |
//!
//! With early metadata enabled, the first 10 bytes are decoded and emitted as
//! soon as they arrive, so a UI can show the card number before the punches
//! have been transferred.

use std::borrow::Cow;

use nom::{
    bytes::complete::take,
    combinator::map_res,
    number::complete::be_u8,
    IResult,
};
use serde::Serialize;

use crate::constants::{
    CONTROL_PUNCH_REGION_LEN, EMIT250_DESCRAMBLE_KEY, EMIT250_FRAME_LEN, EMIT250_METADATA_LEN,
    EMIT250_PREAMBLE_LEN,
};
use crate::error::DecodeError;
use crate::framing::{Boundary, FrameDecoder, FrameProtocol, FrameSize, FrameWindow};
use crate::payload::{ascii_text, control_punches, le_uint, zero_sum_valid, ControlPunch};

const HEAD_CHECK_START: usize = 2;
const TIME_SYSTEM_LEN: usize = 32;
const DISPLAY_LEN: usize = 8;

/// Streaming decoder for an EMIT 250 reader
pub type Emit250Decoder = FrameDecoder<Emit250>;

/// An e-card read by an EMIT 250 reader.
///
/// Early metadata emissions carry only the header: no punches, no text,
/// `valid_transfer_check == false` and `finished_reading == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ecard250 {
    pub ecard_number: u32,
    pub production_week: u8,
    pub production_year: u8,
    pub valid_head_check: bool,
    pub control_punches: Vec<ControlPunch>,
    pub emit_time_system: Option<String>,
    pub display_line_1: Option<String>,
    pub display_line_2: Option<String>,
    pub display_line_3: Option<String>,
    pub valid_transfer_check: bool,
    pub finished_reading: bool,
}

/// EMIT 250 half of the streaming decoder
#[derive(Debug, Clone)]
pub struct Emit250 {
    emit_metadata: bool,
    metadata_sent: bool,
}

impl Emit250 {
    /// `emit_metadata`: emit a header-only [`Ecard250`] before every full one
    pub fn new(emit_metadata: bool) -> Self {
        Self {
            emit_metadata,
            metadata_sent: false,
        }
    }

    pub fn emit_metadata(&self) -> bool {
        self.emit_metadata
    }
}

impl Emit250Decoder {
    /// Decoder for an EMIT 250 serial stream
    pub fn emit250(emit_metadata: bool) -> Self {
        FrameDecoder::new(Emit250::new(emit_metadata))
    }
}

impl FrameProtocol for Emit250 {
    type Record = Ecard250;

    fn name(&self) -> &'static str {
        "EMIT 250"
    }

    fn boundary(&self) -> Boundary {
        Boundary::Preamble {
            length: EMIT250_PREAMBLE_LEN,
        }
    }

    fn max_frame_len(&self) -> usize {
        EMIT250_FRAME_LEN
    }

    fn filter<'a>(&self, chunk: &'a [u8]) -> Cow<'a, [u8]> {
        Cow::Owned(descramble(chunk))
    }

    fn frame_started(&mut self) {
        self.metadata_sent = false;
    }

    fn resolve(&self, _window: &FrameWindow<'_>) -> FrameSize {
        FrameSize::Fixed(EMIT250_FRAME_LEN)
    }

    fn partial(&mut self, window: &FrameWindow<'_>) -> Option<Ecard250> {
        if !self.emit_metadata || self.metadata_sent || window.len() < EMIT250_METADATA_LEN {
            return None;
        }
        self.metadata_sent = true;
        decode_metadata(&window.prefix(EMIT250_METADATA_LEN)).ok()
    }

    fn decode(&mut self, frame: &[u8]) -> Result<Ecard250, DecodeError> {
        self.metadata_sent = false;
        decode_ecard(frame)
    }
}

/// Undo the line scrambling of an EMIT 250 reader
pub fn descramble(chunk: &[u8]) -> Vec<u8> {
    chunk.iter().map(|byte| byte ^ EMIT250_DESCRAMBLE_KEY).collect()
}

struct Header {
    ecard_number: u32,
    production_week: u8,
    production_year: u8,
}

struct RawEcard<'a> {
    header: Header,
    punches: &'a [u8],
    time_system: &'a [u8],
    display: [&'a [u8]; 3],
}

fn header(input: &[u8]) -> IResult<&[u8], Header> {
    let (input, _preamble) = take(EMIT250_PREAMBLE_LEN)(input)?;
    let (input, ecard_number) = map_res(take(3usize), le_uint)(input)?;
    let (input, _) = take(1usize)(input)?;
    let (input, production_week) = be_u8(input)?;
    let (input, production_year) = be_u8(input)?;
    let (input, _head_check) = take(2usize)(input)?;
    Ok((
        input,
        Header {
            ecard_number,
            production_week,
            production_year,
        },
    ))
}

fn raw_ecard(input: &[u8]) -> IResult<&[u8], RawEcard<'_>> {
    let (input, header) = header(input)?;
    let (input, punches) = take(CONTROL_PUNCH_REGION_LEN)(input)?;
    let (input, time_system) = take(TIME_SYSTEM_LEN)(input)?;
    let (input, display_1) = take(DISPLAY_LEN)(input)?;
    let (input, display_2) = take(DISPLAY_LEN)(input)?;
    let (input, display_3) = take(DISPLAY_LEN)(input)?;
    let (input, _transfer_check) = be_u8(input)?;
    Ok((
        input,
        RawEcard {
            header,
            punches,
            time_system,
            display: [display_1, display_2, display_3],
        },
    ))
}

/// Decode a complete 217-byte frame (already descrambled)
pub fn decode_ecard(frame: &[u8]) -> Result<Ecard250, DecodeError> {
    if frame.len() < EMIT250_FRAME_LEN {
        return Err(DecodeError::Truncated {
            needed: EMIT250_FRAME_LEN,
            available: frame.len(),
        });
    }
    let frame = &frame[..EMIT250_FRAME_LEN];
    let (_, raw) = raw_ecard(frame)?;

    Ok(Ecard250 {
        ecard_number: raw.header.ecard_number,
        production_week: raw.header.production_week,
        production_year: raw.header.production_year,
        valid_head_check: zero_sum_valid(&frame[HEAD_CHECK_START..EMIT250_METADATA_LEN]),
        control_punches: control_punches(raw.punches),
        emit_time_system: Some(ascii_text(raw.time_system)),
        display_line_1: Some(ascii_text(raw.display[0])),
        display_line_2: Some(ascii_text(raw.display[1])),
        display_line_3: Some(ascii_text(raw.display[2])),
        valid_transfer_check: zero_sum_valid(frame),
        finished_reading: true,
    })
}

/// Decode the 10-byte header prefix of a frame
pub fn decode_metadata(prefix: &[u8]) -> Result<Ecard250, DecodeError> {
    if prefix.len() < EMIT250_METADATA_LEN {
        return Err(DecodeError::Truncated {
            needed: EMIT250_METADATA_LEN,
            available: prefix.len(),
        });
    }
    let (_, header) = header(prefix)?;

    Ok(Ecard250 {
        ecard_number: header.ecard_number,
        production_week: header.production_week,
        production_year: header.production_year,
        valid_head_check: zero_sum_valid(&prefix[HEAD_CHECK_START..EMIT250_METADATA_LEN]),
        control_punches: Vec::new(),
        emit_time_system: None,
        display_line_1: None,
        display_line_2: None,
        display_line_3: None,
        valid_transfer_check: false,
        finished_reading: false,
    })
}
