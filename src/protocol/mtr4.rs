//! # MTR4 Protocol
//!
//! The MTR4 sends two kinds of package, both starting with four `0xFF` bytes.
//! The package type at offset 5 decides the length:
//!
//! - `'S'` status message, 59 bytes: clock, battery and session bookkeeping
//! - `'M'` e-card message, 234 bytes: one e-card read with its punches
//!
//! Every package shares a 16-byte header (preamble, size, type, MTR id,
//! timestamp, milliseconds). Checksums are stored in the package: the byte
//! after a region holds the mod-256 sum of the region.

use nom::{
    bytes::complete::take,
    combinator::{map_res, peek},
    multi::count,
    number::complete::{be_u8, le_u16, le_u32},
    IResult,
};
use serde::Serialize;

use crate::constants::{
    CONTROL_PUNCH_REGION_LEN, MTR4_ECARD_LEN, MTR4_ECARD_TAG, MTR4_PREAMBLE_LEN, MTR4_STATUS_LEN,
    MTR4_STATUS_TAG, MTR4_TYPE_OFFSET,
};
use crate::error::DecodeError;
use crate::framing::{Boundary, FrameDecoder, FrameProtocol, FrameSize, FrameWindow};
use crate::payload::{
    ascii_text, control_punches, device_time, le_uint, trailing_checksum_valid, ControlPunch,
    DeviceTime,
};

const PREVIOUS_SESSIONS: usize = 7;
const ASCII_REGION_LEN: usize = 56;
const STATUS_CHECKSUM_OFFSET: usize = 57;
const ECARD_CHECKSUM_OFFSET: usize = 232;
const HEAD_CHECK_RANGE: std::ops::Range<usize> = 4..26;

/// Streaming decoder for an MTR4
pub type Mtr4Decoder = FrameDecoder<Mtr4>;

/// Battery flag reported by the MTR4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatteryStatus {
    Ok,
    Low,
}

impl From<u8> for BatteryStatus {
    fn from(raw: u8) -> Self {
        match raw {
            0 => BatteryStatus::Ok,
            _ => BatteryStatus::Low,
        }
    }
}

/// Status package (`'S'`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MtrStatus {
    pub package_size: u8,
    pub mtr_id: u16,
    pub current_time: DeviceTime,
    pub milliseconds: u16,
    pub battery_status: BatteryStatus,
    pub recent_package: u32,
    pub oldest_package: u32,
    pub current_session_start: u32,
    /// Most recent first
    pub previous_session_starts: Vec<u32>,
    pub checksum: u8,
    pub valid_transfer_check: bool,
}

/// E-card package (`'M'`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MtrEcard {
    pub package_size: u8,
    pub mtr_id: u16,
    pub timestamp: DeviceTime,
    pub milliseconds: u16,
    /// Read from the low byte of the package number
    pub battery_status: BatteryStatus,
    pub package_number: u32,
    pub ecard_number: u32,
    pub production_week: u8,
    pub production_year: u8,
    pub valid_head_check: bool,
    pub control_punches: Vec<ControlPunch>,
    pub ascii_string: String,
    pub checksum: u8,
    pub valid_transfer_check: bool,
}

/// Record emitted by the MTR4 decoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum MtrMessage {
    Status(MtrStatus),
    Ecard(MtrEcard),
}

/// MTR4 half of the streaming decoder
#[derive(Debug, Clone, Default)]
pub struct Mtr4;

impl Mtr4 {
    pub fn new() -> Self {
        Mtr4
    }
}

impl Mtr4Decoder {
    /// Decoder for an MTR4 serial stream
    pub fn mtr4() -> Self {
        FrameDecoder::new(Mtr4::new())
    }
}

impl FrameProtocol for Mtr4 {
    type Record = MtrMessage;

    fn name(&self) -> &'static str {
        "MTR4"
    }

    fn boundary(&self) -> Boundary {
        Boundary::Preamble {
            length: MTR4_PREAMBLE_LEN,
        }
    }

    fn max_frame_len(&self) -> usize {
        MTR4_ECARD_LEN
    }

    fn resolve(&self, window: &FrameWindow<'_>) -> FrameSize {
        match window.byte(MTR4_TYPE_OFFSET) {
            None => FrameSize::Pending,
            Some(MTR4_STATUS_TAG) => FrameSize::Fixed(MTR4_STATUS_LEN),
            Some(MTR4_ECARD_TAG) => FrameSize::Fixed(MTR4_ECARD_LEN),
            Some(tag) => FrameSize::Unknown(tag),
        }
    }

    fn decode(&mut self, frame: &[u8]) -> Result<MtrMessage, DecodeError> {
        decode_message(frame)
    }
}

struct Header {
    package_size: u8,
    mtr_id: u16,
    time: DeviceTime,
    milliseconds: u16,
}

fn header(input: &[u8]) -> IResult<&[u8], Header> {
    let (input, _preamble) = take(MTR4_PREAMBLE_LEN)(input)?;
    let (input, package_size) = be_u8(input)?;
    let (input, _package_type) = be_u8(input)?;
    let (input, mtr_id) = le_u16(input)?;
    let (input, time) = device_time(input)?;
    let (input, milliseconds) = le_u16(input)?;
    Ok((
        input,
        Header {
            package_size,
            mtr_id,
            time,
            milliseconds,
        },
    ))
}

fn status(input: &[u8]) -> IResult<&[u8], MtrStatus> {
    let (input, header) = header(input)?;
    let (input, battery) = be_u8(input)?;
    let (input, recent_package) = le_u32(input)?;
    let (input, oldest_package) = le_u32(input)?;
    let (input, current_session_start) = le_u32(input)?;
    let (input, previous_session_starts) = count(le_u32, PREVIOUS_SESSIONS)(input)?;
    let (input, checksum) = be_u8(input)?;
    let (input, _filler) = be_u8(input)?;
    Ok((
        input,
        MtrStatus {
            package_size: header.package_size,
            mtr_id: header.mtr_id,
            current_time: header.time,
            milliseconds: header.milliseconds,
            battery_status: battery.into(),
            recent_package,
            oldest_package,
            current_session_start,
            previous_session_starts,
            checksum,
            valid_transfer_check: false,
        },
    ))
}

fn ecard(input: &[u8]) -> IResult<&[u8], MtrEcard> {
    let (input, header) = header(input)?;
    let (input, battery) = peek(be_u8)(input)?;
    let (input, package_number) = le_u32(input)?;
    let (input, ecard_number) = map_res(take(3usize), le_uint)(input)?;
    let (input, production_week) = be_u8(input)?;
    let (input, production_year) = be_u8(input)?;
    let (input, _head_check) = be_u8(input)?;
    let (input, punches) = take(CONTROL_PUNCH_REGION_LEN)(input)?;
    let (input, text) = take(ASCII_REGION_LEN)(input)?;
    let (input, checksum) = be_u8(input)?;
    let (input, _filler) = be_u8(input)?;
    Ok((
        input,
        MtrEcard {
            package_size: header.package_size,
            mtr_id: header.mtr_id,
            timestamp: header.time,
            milliseconds: header.milliseconds,
            battery_status: battery.into(),
            package_number,
            ecard_number,
            production_week,
            production_year,
            valid_head_check: false,
            control_punches: control_punches(punches),
            ascii_string: ascii_text(text),
            checksum,
            valid_transfer_check: false,
        },
    ))
}

fn expect_len(frame: &[u8], needed: usize) -> Result<&[u8], DecodeError> {
    frame.get(..needed).ok_or(DecodeError::Truncated {
        needed,
        available: frame.len(),
    })
}

/// Decode a complete status package
pub fn decode_status(frame: &[u8]) -> Result<MtrStatus, DecodeError> {
    let frame = expect_len(frame, MTR4_STATUS_LEN)?;
    let (_, mut message) = status(frame)?;
    message.valid_transfer_check = trailing_checksum_valid(&frame[..=STATUS_CHECKSUM_OFFSET]);
    Ok(message)
}

/// Decode a complete e-card package
pub fn decode_ecard(frame: &[u8]) -> Result<MtrEcard, DecodeError> {
    let frame = expect_len(frame, MTR4_ECARD_LEN)?;
    let (_, mut message) = ecard(frame)?;
    message.valid_head_check = trailing_checksum_valid(&frame[HEAD_CHECK_RANGE]);
    message.valid_transfer_check = trailing_checksum_valid(&frame[..=ECARD_CHECKSUM_OFFSET]);
    Ok(message)
}

/// Decode a complete package of either type
pub fn decode_message(frame: &[u8]) -> Result<MtrMessage, DecodeError> {
    match frame.get(MTR4_TYPE_OFFSET) {
        Some(&MTR4_STATUS_TAG) => decode_status(frame).map(MtrMessage::Status),
        Some(&MTR4_ECARD_TAG) => decode_ecard(frame).map(MtrMessage::Ecard),
        Some(&tag) => Err(DecodeError::UnknownFrameType(tag)),
        None => Err(DecodeError::Truncated {
            needed: MTR4_TYPE_OFFSET + 1,
            available: frame.len(),
        }),
    }
}
