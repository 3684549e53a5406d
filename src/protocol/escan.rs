//! # eScan / ECU Protocol
//!
//! eScan and ECU units talk over USB and send text frames delimited by STX
//! (`0x02`) and ETX (`0x03`). The first byte inside a frame selects its kind:
//! `'I'` for a status/identification frame, `'N'` for a dump of a tag.
//! Status fields are tab-separated and prefixed by a letter.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::constants::{
    ESCAN_DUMP_TAG, ESCAN_MAX_FRAME_LEN, ESCAN_RING_CAPACITY, ESCAN_STATUS_TAG, USB_START_BYTE,
    USB_STOP_BYTE,
};
use crate::error::DecodeError;
use crate::framing::{Boundary, FrameDecoder, FrameProtocol};
use crate::payload::ascii_text;

const UNKNOWN: &str = "unknown";

static IDENTIFICATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"I(?P<product>\w+?)-HW(?P<hw>.+?)-SW(?P<sw>.+?)-V(?P<version>.+?)\s")
        .expect("identification pattern")
});
static MESSAGE_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\tB(?P<value>\w)\t").expect("message type pattern"));
static ELINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\tC(?P<value>[0-9]{1,3})\t").expect("eline code pattern"));
static TAG_PROTOCOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\tX(?P<value>[0-9])\t").expect("tag protocol pattern"));
static SERIAL_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\tY(?P<value>[0-9]+)\t").expect("serial number pattern"));
static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\tU(?P<value>[0-9]{2}[.][0-9]{2}[.][0-9]{4})\t").expect("date pattern")
});
static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\tW(?P<value>[0-9]{2}:[0-9]{2}:[0-9]{2}[.][0-9]{3})").expect("time pattern")
});

/// Streaming decoder for an eScan or ECU USB stream
pub type EscanDecoder = FrameDecoder<Escan>;

/// Status/identification frame (`'I'`)
///
/// The battery, status and ECU counter fields are not parsed yet and are
/// always `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsbStatusFrame {
    pub product_name: String,
    pub hardware_version: String,
    pub software_version: String,
    pub version: String,
    pub message_type: Option<String>,
    pub eline_code: String,
    pub tag_protocol: Option<String>,
    pub serial_number: String,
    /// `dd.mm.yyyy` as sent
    pub date: String,
    /// `hh:mm:ss.mmm` as sent
    pub time: String,
    pub battery_voltage_millivolt: Option<u32>,
    pub usb_voltage_millivolt: Option<u32>,
    pub battery_percentage: Option<u8>,
    pub status_message_and_event: Option<String>,
    pub ecu_first_message_number_today: Option<u32>,
    pub ecu_total_messages_today: Option<u32>,
}

/// Dump of a tag (`'N'`); only the raw text is kept for now
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpTagFrame {
    /// Product of the most recent status frame
    pub product_name: String,
    pub text: String,
}

/// Record emitted by the eScan decoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum EscanFrame {
    Status(UsbStatusFrame),
    DumpTag(DumpTagFrame),
}

/// eScan half of the streaming decoder
#[derive(Debug, Clone, Default)]
pub struct Escan {
    last_product: Option<String>,
}

impl Escan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Product name of the last status frame seen
    pub fn last_product(&self) -> Option<&str> {
        self.last_product.as_deref()
    }
}

impl EscanDecoder {
    /// Decoder for an eScan/ECU USB stream
    pub fn escan() -> Self {
        FrameDecoder::new(Escan::new())
    }
}

impl FrameProtocol for Escan {
    type Record = EscanFrame;

    fn name(&self) -> &'static str {
        "eScan"
    }

    fn boundary(&self) -> Boundary {
        Boundary::Markers {
            start: USB_START_BYTE,
            stop: USB_STOP_BYTE,
        }
    }

    fn max_frame_len(&self) -> usize {
        ESCAN_MAX_FRAME_LEN
    }

    fn ring_capacity(&self) -> usize {
        ESCAN_RING_CAPACITY
    }

    fn decode(&mut self, frame: &[u8]) -> Result<EscanFrame, DecodeError> {
        match frame.first() {
            Some(&ESCAN_STATUS_TAG) => {
                let status = parse_status(&ascii_text(frame));
                self.last_product = Some(status.product_name.clone());
                Ok(EscanFrame::Status(status))
            }
            Some(&ESCAN_DUMP_TAG) => Ok(EscanFrame::DumpTag(DumpTagFrame {
                product_name: self.last_product.clone().unwrap_or_else(|| UNKNOWN.into()),
                text: ascii_text(frame),
            })),
            Some(&tag) => Err(DecodeError::UnknownFrameType(tag)),
            None => Err(DecodeError::Truncated {
                needed: 1,
                available: 0,
            }),
        }
    }
}

fn field(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.name("value"))
        .map(|m| m.as_str().to_string())
}

/// Extract the fields of a status frame; missing fields get placeholders
pub fn parse_status(text: &str) -> UsbStatusFrame {
    let identification = IDENTIFICATION.captures(text);
    let ident = |name: &str| {
        identification
            .as_ref()
            .and_then(|caps| caps.name(name))
            .map_or_else(|| UNKNOWN.to_string(), |m| m.as_str().to_string())
    };

    UsbStatusFrame {
        product_name: ident("product"),
        hardware_version: ident("hw"),
        software_version: ident("sw"),
        version: ident("version"),
        message_type: field(&MESSAGE_TYPE, text),
        eline_code: field(&ELINE_CODE, text).unwrap_or_default(),
        tag_protocol: field(&TAG_PROTOCOL, text),
        serial_number: field(&SERIAL_NUMBER, text).unwrap_or_default(),
        date: field(&DATE, text).unwrap_or_default(),
        time: field(&TIME, text).unwrap_or_default(),
        battery_voltage_millivolt: None,
        usb_voltage_millivolt: None,
        battery_percentage: None,
        status_message_and_event: None,
        ecu_first_message_number_today: None,
        ecu_total_messages_today: None,
    }
}
