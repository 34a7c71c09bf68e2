//! Frame source traits

use crate::frame::VideoFrame;
use crate::VideoError;

/// An open, forward-only stream of frames for one video.
///
/// Dropping the source releases its decoding handle.
pub trait VideoSource {
    /// Read the next frame.
    ///
    /// `Ok(None)` signals end-of-stream; `Err` is a read failure.
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, VideoError>;
}

/// Opens video identifiers into frame sources
pub trait VideoBackend {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Open `id` for reading
    fn open(&mut self, id: &str) -> Result<Box<dyn VideoSource>, VideoError>;
}

impl<S: VideoSource + ?Sized> VideoSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, VideoError> {
        (**self).next_frame()
    }
}
