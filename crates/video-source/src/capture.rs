//! Recorded video files through OpenCV `videoio`

use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::{debug, info, warn};

use crate::frame::VideoFrame;
use crate::source::{VideoBackend, VideoSource};
use crate::VideoError;

/// Backend decoding video files with OpenCV
#[derive(Debug, Default)]
pub struct OpenCvBackend;

impl OpenCvBackend {
    pub fn new() -> Self {
        Self
    }
}

impl VideoBackend for OpenCvBackend {
    fn name(&self) -> &'static str {
        "opencv"
    }

    fn open(&mut self, id: &str) -> Result<Box<dyn VideoSource>, VideoError> {
        let cap = VideoCapture::from_file(id, videoio::CAP_ANY)
            .map_err(|e| VideoError::open(id, e.to_string()))?;

        if !cap.is_opened().map_err(|e| VideoError::open(id, e.to_string()))? {
            return Err(VideoError::open(id, "capture did not open"));
        }

        let fps = cap.get(videoio::CAP_PROP_FPS).unwrap_or(0.0);
        let frames = cap.get(videoio::CAP_PROP_FRAME_COUNT).unwrap_or(0.0) as i64;
        info!("Opened video {} ({:.1} FPS, {} frames)", id, fps, frames);

        Ok(Box::new(CaptureSource {
            id: id.to_string(),
            cap,
            fps,
            sequence: 0,
        }))
    }
}

/// Open capture handle
struct CaptureSource {
    id: String,
    cap: VideoCapture,
    fps: f64,
    sequence: u32,
}

impl CaptureSource {
    fn read_error(&self, e: opencv::Error) -> VideoError {
        VideoError::Read {
            sequence: self.sequence,
            reason: e.to_string(),
        }
    }
}

impl VideoSource for CaptureSource {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, VideoError> {
        let mut bgr = Mat::default();
        let grabbed = self.cap.read(&mut bgr).map_err(|e| self.read_error(e))?;
        if !grabbed || bgr.empty() {
            debug!("End of stream for {}", self.id);
            return Ok(None);
        }

        // Frames leave this boundary as RGB
        let mut rgb = Mat::default();
        imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)
            .map_err(|e| self.read_error(e))?;

        let data = rgb.data_bytes().map_err(|e| self.read_error(e))?.to_vec();
        let timestamp_ns = if self.fps > 0.0 {
            (self.sequence as f64 / self.fps * 1e9) as u64
        } else {
            0
        };

        let frame = VideoFrame::new(
            data,
            rgb.cols() as u32,
            rgb.rows() as u32,
            timestamp_ns,
            self.sequence,
        );
        self.sequence += 1;
        Ok(Some(frame))
    }
}

impl Drop for CaptureSource {
    fn drop(&mut self) {
        if let Err(e) = self.cap.release() {
            warn!("Failed to release capture for {}: {}", self.id, e);
        }
    }
}
