//! # Field Decoders
//!
//! Fixed-offset field extraction shared by the EMIT 250 and MTR4 layouts:
//! little-endian integers, the 6-byte device clock, ASCII text and the runs
//! of control punches recorded on an e-card.

use chrono::{NaiveDate, NaiveDateTime};
use nom::{bytes::complete::take, combinator::map_res, IResult};
use serde::Serialize;

use crate::error::DecodeError;

/// One timestamped checkpoint on an e-card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlPunch {
    pub code: u8,
    /// Time as stored by the card, low byte first on the wire
    pub time: u16,
}

/// Device clock as sent by the MTR4: `[year, month, day, hour, minute, second]`
///
/// Components are kept as received. Out-of-range values are not corrected;
/// [`DeviceTime::to_naive`] returns `None` for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceTime {
    pub year: u16,
    /// 1-based
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DeviceTime {
    /// Decode the 6-byte clock layout
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        match bytes {
            [year, month, day, hour, minute, second] => Ok(Self {
                year: full_year(*year),
                month: *month,
                day: *day,
                hour: *hour,
                minute: *minute,
                second: *second,
            }),
            _ => Err(DecodeError::Truncated {
                needed: 6,
                available: bytes.len(),
            }),
        }
    }

    /// Calendar date and time, if the components form a valid one
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(i32::from(self.year), u32::from(self.month), u32::from(self.day))?
            .and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
    }
}

/// nom parser for a [`DeviceTime`]
pub fn device_time(input: &[u8]) -> IResult<&[u8], DeviceTime> {
    map_res(take(6usize), DeviceTime::from_bytes)(input)
}

/// Two-digit year on the wire: 90–99 are 1990–1999, everything else 2000+
pub fn full_year(raw: u8) -> u16 {
    match raw {
        90..=99 => 1900 + u16::from(raw),
        _ => 2000 + u16::from(raw),
    }
}

/// Little-endian unsigned integer of one to four bytes
pub fn le_uint(bytes: &[u8]) -> Result<u32, DecodeError> {
    if bytes.len() > 4 {
        return Err(DecodeError::IntegerTooWide { len: bytes.len() });
    }

    Ok(bytes
        .iter()
        .enumerate()
        .fold(0u32, |value, (i, byte)| value | (u32::from(*byte) << (8 * i))))
}

/// Printable characters windows-1252 assigns to 0x80..=0x9F.
///
/// The five unassigned bytes keep their C1 control code point.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Text field as the readers' firmware writes it (windows-1252, which is
/// what an "ascii" label decodes to on the web platform).
///
/// Every byte maps to one char and nothing is trimmed.
pub fn ascii_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&byte| match byte {
            0x80..=0x9F => CP1252_HIGH[usize::from(byte - 0x80)],
            _ => char::from(byte),
        })
        .collect()
}

/// Decode a control punch region of `[code, time_lo, time_hi]` groups.
///
/// Only the first group may have code 0 (a card without punches); a later 0
/// ends the list. The finish control is punched repeatedly while the card
/// sits on the reader, so every repeat of the last code is dropped and only
/// its first occurrence is kept.
pub fn control_punches(region: &[u8]) -> Vec<ControlPunch> {
    let mut punches: Vec<ControlPunch> = region
        .chunks_exact(3)
        .enumerate()
        .take_while(|(i, group)| *i == 0 || group[0] != 0)
        .map(|(_, group)| ControlPunch {
            code: group[0],
            time: u16::from_le_bytes([group[1], group[2]]),
        })
        .collect();

    if let Some(finish) = punches.last().map(|punch| punch.code) {
        if let Some(first) = punches.iter().position(|punch| punch.code == finish) {
            let mut index = 0;
            punches.retain(|punch| {
                let keep = punch.code != finish || index == first;
                index += 1;
                keep
            });
        }
    }

    punches
}
