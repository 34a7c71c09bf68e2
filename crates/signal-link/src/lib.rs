//! Signal Controller Link
//!
//! This crate streams countdown records to an external signal controller
//! (an ESP32-class board) over a serial port. The protocol is one ASCII
//! line per processed frame, fire-and-forget: no framing, checksum, or
//! acknowledgement.

mod error;
mod link;
mod record;

pub use error::LinkError;
pub use link::{LinkConfig, SignalLink};
pub use record::SignalRecord;
pub use tokio_serial::SerialStream;

/// Wire constants
pub mod wire {
    /// Field separator
    pub const SEPARATOR: char = ',';
    /// Record terminator
    pub const TERMINATOR: char = '\n';
    /// Fields per record
    pub const FIELD_COUNT: usize = 7;
}
