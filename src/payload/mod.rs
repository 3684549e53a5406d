//! The payload module contains the decoders for the fields inside a complete
//! frame and the checksum arithmetic that validates them.

pub mod checksum;
pub mod fields;

pub use checksum::{checksum_matches, sum_mod256, trailing_checksum_valid, zero_sum_valid};
pub use fields::{
    ascii_text, control_punches, device_time, full_year, le_uint, ControlPunch, DeviceTime,
};
