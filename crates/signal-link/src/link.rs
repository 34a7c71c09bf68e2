//! Serial link to the signal controller
//!
//! Reporting never fails the pipeline: an unavailable port degrades the
//! link to a no-op and write failures are only logged.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, warn};

use crate::error::LinkError;
use crate::record::SignalRecord;

/// Serial link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Open the port at all
    pub enabled: bool,
    /// Serial port device path (e.g., "/dev/ttyUSB0" or "COM6")
    pub device: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Wait after opening while the controller resets (milliseconds)
    pub settle_ms: u64,
    /// Port read/write timeout (milliseconds)
    pub timeout_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            settle_ms: 2000,
            timeout_ms: 1000,
        }
    }
}

/// Fire-and-forget record sink
pub struct SignalLink<W = SerialStream> {
    /// Device the link was configured for
    device: String,
    /// Open sink, `None` when unavailable
    sink: Option<W>,
    /// Records written successfully
    sent: u64,
    /// Records whose write failed
    failed: u64,
}

impl SignalLink<SerialStream> {
    /// Open the configured serial port.
    ///
    /// Never fails: when the port cannot be opened a warning is logged once
    /// and a disabled link is returned.
    pub async fn open(config: &LinkConfig) -> Self {
        if !config.enabled {
            info!("Serial link disabled by configuration, reporting skipped");
            return Self::disabled(&config.device);
        }

        match Self::try_open(config) {
            Ok(stream) => {
                tokio::time::sleep(Duration::from_millis(config.settle_ms)).await;
                info!(
                    "Serial port {} opened at {} baud",
                    config.device, config.baud_rate
                );
                Self::connected(&config.device, stream)
            }
            Err(e) => {
                warn!("{}; continuing in detection-only mode", e);
                Self::disabled(&config.device)
            }
        }
    }

    /// Open the port without the fallback
    pub fn try_open(config: &LinkConfig) -> Result<SerialStream, LinkError> {
        tokio_serial::new(config.device.as_str(), config.baud_rate)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open_native_async()
            .map_err(|e| LinkError::Open {
                device: config.device.clone(),
                reason: e.to_string(),
            })
    }
}

impl<W: AsyncWrite + Unpin> SignalLink<W> {
    /// Link writing to an already open sink
    pub fn connected(device: &str, sink: W) -> Self {
        Self {
            device: device.to_string(),
            sink: Some(sink),
            sent: 0,
            failed: 0,
        }
    }

    /// Link that drops every record
    pub fn disabled(device: &str) -> Self {
        Self {
            device: device.to_string(),
            sink: None,
            sent: 0,
            failed: 0,
        }
    }

    /// Whether records reach a sink
    pub fn is_connected(&self) -> bool {
        self.sink.is_some()
    }

    /// Device path
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Records written successfully
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Records whose write failed
    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Write one record line. Returns whether it was written.
    pub async fn send(&mut self, record: &SignalRecord) -> bool {
        let Some(sink) = self.sink.as_mut() else {
            return false;
        };

        match write_line(sink, record.to_line().as_bytes()).await {
            Ok(()) => {
                self.sent += 1;
                debug!("Sent record: {}", record);
                true
            }
            Err(e) => {
                self.failed += 1;
                warn!("Dropping record {} for {}: {}", record, self.device, e);
                false
            }
        }
    }

    /// Flush and release the sink
    pub async fn close(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = sink.shutdown().await {
                warn!("Error while closing {}: {}", self.device, e);
            }
            info!(
                "Serial port {} closed ({} records sent, {} failed)",
                self.device, self.sent, self.failed
            );
        }
    }

    /// Take the sink back out of the link
    pub fn into_sink(self) -> Option<W> {
        self.sink
    }
}

async fn write_line<W: AsyncWrite + Unpin>(sink: &mut W, line: &[u8]) -> Result<(), LinkError> {
    sink.write_all(line).await?;
    sink.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Sink whose every write fails
    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn record(countdown: u32, car: u32) -> SignalRecord {
        SignalRecord {
            countdown,
            car,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_records_are_written_as_lines() {
        let mut link = SignalLink::connected("mock", Vec::<u8>::new());
        assert!(link.send(&record(5, 2)).await);
        assert!(link.send(&record(4, 3)).await);
        assert_eq!(link.sent(), 2);

        let bytes = link.into_sink().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "5,2,0,0,0,0,0\n4,3,0,0,0,0,0\n");
    }

    #[tokio::test]
    async fn test_disabled_link_is_noop() {
        let mut link: SignalLink<Vec<u8>> = SignalLink::disabled("mock");
        assert!(!link.is_connected());
        assert!(!link.send(&record(1, 1)).await);
        assert_eq!(link.sent(), 0);
        link.close().await;
    }

    #[tokio::test]
    async fn test_write_failure_does_not_propagate() {
        let mut link = SignalLink::connected("mock", BrokenPipe);
        assert!(!link.send(&record(3, 0)).await);
        assert!(!link.send(&record(2, 0)).await);
        assert_eq!(link.failed(), 2);
        // Still attached; failures are per record
        assert!(link.is_connected());
    }

    #[tokio::test]
    async fn test_close_releases_sink() {
        let mut link = SignalLink::connected("mock", Vec::<u8>::new());
        link.close().await;
        assert!(!link.is_connected());
        assert!(!link.send(&record(1, 0)).await);
    }

    #[tokio::test]
    async fn test_unavailable_port_degrades() {
        let config = LinkConfig {
            device: "/dev/no-such-signal-controller".to_string(),
            settle_ms: 0,
            ..Default::default()
        };
        let mut link = SignalLink::open(&config).await;
        assert!(!link.is_connected());
        assert!(!link.send(&record(9, 9)).await);
    }

    #[tokio::test]
    async fn test_disabled_by_config() {
        let config = LinkConfig {
            enabled: false,
            ..Default::default()
        };
        let link = SignalLink::open(&config).await;
        assert!(!link.is_connected());
        assert_eq!(link.device(), "/dev/ttyUSB0");
    }
}
