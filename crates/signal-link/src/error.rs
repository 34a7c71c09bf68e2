//! Signal Link Error Types

use thiserror::Error;

/// Errors that can occur on the controller link
#[derive(Debug, Error)]
pub enum LinkError {
    /// Serial port could not be opened
    #[error("Cannot open serial port {device}: {reason}")]
    Open { device: String, reason: String },

    /// Write to the port failed
    #[error("Serial write failed: {0}")]
    Write(String),
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        LinkError::Write(err.to_string())
    }
}
