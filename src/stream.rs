//! # Async Transport Adapter
//!
//! Feeds a [`FrameDecoder`] from any [`AsyncRead`] (a serial port, a USB
//! endpoint wrapper, a capture file) and forwards records into a bounded
//! channel. Sending awaits free capacity, so a slow consumer stops the reads
//! instead of growing a queue.
//!
//! ```rust,no_run
//! use emit_rs::{stream::pump, Mtr4Decoder, SerialSettings};
//! use tokio::sync::mpsc;
//!
//! # async fn run() -> Result<(), emit_rs::EmitError> {
//! let port = SerialSettings::MTR4.open("/dev/ttyUSB0")?;
//! let mut decoder = Mtr4Decoder::mtr4();
//! let (tx, mut rx) = mpsc::channel(16);
//! tokio::spawn(async move {
//!     while let Some(message) = rx.recv().await {
//!         println!("{message:?}");
//!     }
//! });
//! pump(port, &mut decoder, tx).await?;
//! # Ok(())
//! # }
//! ```

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;

use crate::error::EmitError;
use crate::framing::{FrameDecoder, FrameProtocol};
use crate::logging::log_debug;

const READ_BUFFER_LEN: usize = 1024;

/// Read until EOF, decoding every read and sending the records to `tx`.
///
/// Returns the number of bytes read. Fails on a read error or when the
/// receiver is dropped.
pub async fn pump<R, P>(
    mut reader: R,
    decoder: &mut FrameDecoder<P>,
    tx: mpsc::Sender<P::Record>,
) -> Result<u64, EmitError>
where
    R: AsyncRead + Unpin,
    P: FrameProtocol,
{
    let mut buf = BytesMut::with_capacity(READ_BUFFER_LEN);
    let mut total = 0u64;

    loop {
        buf.clear();
        let n = reader.read_buf(&mut buf).await?;
        if n == 0 {
            break;
        }
        total += n as u64;
        decoder.add_chunk(&buf[..n]);

        while let Some(record) = decoder.next_record() {
            tx.send(record).await.map_err(|_| EmitError::ChannelClosed)?;
        }
    }

    log_debug(&format!(
        "{}: end of stream after {total} bytes, {:?}",
        decoder.protocol().name(),
        decoder.stats()
    ));
    Ok(total)
}
