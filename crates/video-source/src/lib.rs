//! Video Source Library for the Traffic Countdown Pipeline
//!
//! Provides ordered, finite, non-seekable frame streams per video identifier.
//! Supports:
//! - Image-sequence directories (one decoded image per frame)
//! - Recorded video files through OpenCV (`opencv` feature)

pub mod frame;
pub mod sequence;
pub mod source;

#[cfg(feature = "opencv")]
pub mod capture;

pub use frame::VideoFrame;
pub use sequence::ImageSequenceBackend;
pub use source::{VideoBackend, VideoSource};

#[cfg(feature = "opencv")]
pub use capture::OpenCvBackend;

use thiserror::Error;

/// Video source error types
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Cannot open video {id}: {reason}")]
    Open { id: String, reason: String },

    #[error("Failed to read frame {sequence}: {reason}")]
    Read { sequence: u32, reason: String },

    #[error("Failed to decode frame: {0}")]
    Decode(String),
}

impl VideoError {
    /// Shorthand for an open failure on `id`
    pub fn open(id: &str, reason: impl Into<String>) -> Self {
        VideoError::Open {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
