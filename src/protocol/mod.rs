//! The protocol module contains the three device families built on the shared
//! streaming engine: EMIT 250 readers, the MTR4 and eScan/ECU USB units.

pub mod emit250;
pub mod escan;
pub mod mtr4;

pub use emit250::{descramble, Ecard250, Emit250, Emit250Decoder};
pub use escan::{DumpTagFrame, Escan, EscanDecoder, EscanFrame, UsbStatusFrame};
pub use mtr4::{BatteryStatus, Mtr4, Mtr4Decoder, MtrEcard, MtrMessage, MtrStatus};
