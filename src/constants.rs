//! EMIT Protocol Constants
//!
//! Frame lengths, type tags and sentinels of the EMIT 250, MTR4 and
//! eScan/ECU wire formats. All frame lengths include the preamble.

/// Byte value used for frame preambles (250 and MTR4)
pub const PREAMBLE_BYTE: u8 = 0xFF;

// ----------------------------------------------------------------------------
// EMIT 250
// ----------------------------------------------------------------------------

/// Number of consecutive `0xFF` bytes starting an EMIT 250 frame
pub const EMIT250_PREAMBLE_LEN: usize = 2;

/// Total length of an EMIT 250 e-card frame
pub const EMIT250_FRAME_LEN: usize = 217;

/// Length of the header prefix sent as early metadata
pub const EMIT250_METADATA_LEN: usize = 10;

/// Every byte from an EMIT 250 reader is XORed with this key
pub const EMIT250_DESCRAMBLE_KEY: u8 = 255 - 32;

// ----------------------------------------------------------------------------
// MTR4
// ----------------------------------------------------------------------------

/// Number of consecutive `0xFF` bytes starting an MTR4 message
pub const MTR4_PREAMBLE_LEN: usize = 4;

/// Offset of the package type byte
pub const MTR4_TYPE_OFFSET: usize = 5;

/// Package type of a status message ('S')
pub const MTR4_STATUS_TAG: u8 = 0x53;

/// Package type of an e-card message ('M')
pub const MTR4_ECARD_TAG: u8 = 0x4D;

/// Total length of a status message
pub const MTR4_STATUS_LEN: usize = 59;

/// Total length of an e-card message
pub const MTR4_ECARD_LEN: usize = 234;

// ----------------------------------------------------------------------------
// eScan / ECU
// ----------------------------------------------------------------------------

/// Start of a USB frame (STX)
pub const USB_START_BYTE: u8 = 0x02;

/// End of a USB frame (ETX)
pub const USB_STOP_BYTE: u8 = 0x03;

/// First content byte of a status/identification frame ('I')
pub const ESCAN_STATUS_TAG: u8 = 0x49;

/// First content byte of a dump-tag frame ('N')
pub const ESCAN_DUMP_TAG: u8 = 0x4E;

/// Ring buffer capacity for USB text frames
pub const ESCAN_RING_CAPACITY: usize = 4000;

/// Longest USB frame accepted before resynchronising
pub const ESCAN_MAX_FRAME_LEN: usize = ESCAN_RING_CAPACITY / 3;

// ----------------------------------------------------------------------------
// Shared field layout
// ----------------------------------------------------------------------------

/// Width of the control punch region in 250 and MTR4 e-card frames
pub const CONTROL_PUNCH_REGION_LEN: usize = 150;

/// Ring buffers hold this many frames of the largest kind
pub const RING_FRAMES: usize = 3;
