//! # Serial Line Settings
//!
//! Line parameters of the serial devices. Opening a port is left to the caller
//! (or to [`SerialSettings::open`]); the decoders only ever see the bytes.

use std::time::Duration;

use tokio_serial::{DataBits, Parity, SerialPortBuilder, SerialPortBuilderExt, SerialStream, StopBits};

use crate::error::EmitError;

/// Configuration for a serial connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub timeout: Duration,
}

impl SerialSettings {
    /// EMIT 250 reader: 9600 baud, 8N2
    pub const EMIT_250: SerialSettings = SerialSettings {
        baud_rate: 9600,
        data_bits: DataBits::Eight,
        stop_bits: StopBits::Two,
        parity: Parity::None,
        timeout: Duration::from_secs(5),
    };

    /// MTR4: 9600 baud, 8N1
    pub const MTR4: SerialSettings = SerialSettings {
        baud_rate: 9600,
        data_bits: DataBits::Eight,
        stop_bits: StopBits::One,
        parity: Parity::None,
        timeout: Duration::from_secs(5),
    };

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Port builder with these settings applied
    pub fn builder<'a>(&self, path: impl Into<std::borrow::Cow<'a, str>>) -> SerialPortBuilder {
        tokio_serial::new(path, self.baud_rate)
            .data_bits(self.data_bits)
            .stop_bits(self.stop_bits)
            .parity(self.parity)
            .timeout(self.timeout)
    }

    /// Open the port for async reading.
    pub fn open(&self, path: &str) -> Result<SerialStream, EmitError> {
        Ok(self.builder(path).open_native_async()?)
    }
}
