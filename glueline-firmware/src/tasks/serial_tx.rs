//! Serial transmit task
//!
//! Encodes events as JSON lines and writes them to the configuration link.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use glueline_protocol::MAX_RECORD_LEN;

use crate::channels::EVENT_CHANNEL;

#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx) {
    info!("Serial TX task started");

    let mut buf = [0u8; MAX_RECORD_LEN];

    loop {
        let event = EVENT_CHANNEL.receive().await;

        let len = match event.encode_line(&mut buf) {
            Ok(len) => len,
            Err(e) => {
                warn!("Failed to encode {}: {:?}", event.name(), e);
                continue;
            }
        };

        if let Err(e) = tx.write_all(&buf[..len]).await {
            warn!("Failed to send {}: {:?}", event.name(), e);
        } else {
            trace!("TX: {}", event.name());
        }
    }
}
