//! Detector input preprocessing
//!
//! Frames arrive as RGB. The blob is a square resize of the whole frame
//! (no crop, no letterbox) scaled to `[0, 1]`, laid out NCHW.

use image::imageops;
use ndarray::Array4;
use video_source::VideoFrame;

use crate::DetectError;

/// Pixel scale factor (1/255)
const PIXEL_SCALE: f32 = 1.0 / 255.0;

/// Build a `1x3xSxS` input tensor from a frame
pub fn blob_from_frame(frame: &VideoFrame, size: u32) -> Result<Array4<f32>, DetectError> {
    if size == 0 {
        return Err(DetectError::InvalidFrame("input size must be positive".into()));
    }

    let image = frame
        .as_image()
        .map_err(|e| DetectError::InvalidFrame(e.to_string()))?;
    let resized = imageops::resize(&image, size, size, imageops::FilterType::Triangle);

    let side = size as usize;
    let mut blob = Array4::<f32>::zeros((1, 3, side, side));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            blob[[0, channel, y as usize, x as usize]] = pixel[channel] as f32 * PIXEL_SCALE;
        }
    }

    Ok(blob)
}
