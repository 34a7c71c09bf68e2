//! Video frame types and processing

use image::{imageops, ImageBuffer, Rgb, RgbImage};

use crate::VideoError;

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Packed RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Presentation timestamp (nanoseconds from stream start)
    pub timestamp_ns: u64,
    /// Frame sequence number within its video
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ns: u64, sequence: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Create a frame filled with a single color
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Self::new(data, width, height, 0, 0)
    }

    /// Build a frame from a decoded image
    pub fn from_image(image: RgbImage, timestamp_ns: u64, sequence: u32) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, timestamp_ns, sequence)
    }

    /// Borrow the pixel data as an image buffer
    pub fn as_image(&self) -> Result<ImageBuffer<Rgb<u8>, &[u8]>, VideoError> {
        ImageBuffer::from_raw(self.width, self.height, self.data.as_slice()).ok_or_else(|| {
            VideoError::Decode(format!(
                "buffer of {} bytes does not hold a {}x{} RGB frame",
                self.data.len(),
                self.width,
                self.height
            ))
        })
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        self.data.get(idx..idx + 3).map(|p| [p[0], p[1], p[2]])
    }

    /// Resize frame using bilinear interpolation
    pub fn resize(&self, new_width: u32, new_height: u32) -> Result<VideoFrame, VideoError> {
        if self.width == new_width && self.height == new_height {
            return Ok(self.clone());
        }

        let resized = imageops::resize(
            &self.as_image()?,
            new_width,
            new_height,
            imageops::FilterType::Triangle,
        );

        Ok(VideoFrame::from_image(
            resized,
            self.timestamp_ns,
            self.sequence,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_solid_frame_pixels() {
        let frame = VideoFrame::solid(4, 3, [10, 20, 30]);
        assert_eq!(frame.data.len(), 36);
        assert_eq!(frame.get_pixel(3, 2), Some([10, 20, 30]));
        assert_eq!(frame.get_pixel(4, 0), None);
    }

    #[test]
    fn test_resize_keeps_metadata() {
        let mut frame = VideoFrame::solid(32, 16, [200, 100, 50]);
        frame.sequence = 7;
        frame.timestamp_ns = 1_000;

        let resized = frame.resize(600, 600).unwrap();
        assert_eq!((resized.width, resized.height), (600, 600));
        assert_eq!(resized.data.len(), 600 * 600 * 3);
        assert_eq!(resized.sequence, 7);
        assert_eq!(resized.timestamp_ns, 1_000);
        assert_eq!(resized.get_pixel(300, 300), Some([200, 100, 50]));
    }

    #[test]
    fn test_truncated_buffer_is_rejected() {
        let frame = VideoFrame::new(vec![0; 10], 4, 4, 0, 0);
        assert!(matches!(frame.as_image(), Err(VideoError::Decode(_))));
    }

    proptest! {
        #[test]
        fn prop_resize_yields_requested_dimensions(
            width in 1u32..48,
            height in 1u32..48,
            new_width in 1u32..64,
            new_height in 1u32..64,
            rgb in prop::array::uniform3(any::<u8>()),
        ) {
            let frame = VideoFrame::solid(width, height, rgb);
            let resized = frame.resize(new_width, new_height).unwrap();

            prop_assert_eq!((resized.width, resized.height), (new_width, new_height));
            prop_assert_eq!(resized.data.len(), (new_width * new_height * 3) as usize);
        }

        #[test]
        fn prop_get_pixel_is_bounds_checked(
            width in 1u32..32,
            height in 1u32..32,
            x in 0u32..64,
            y in 0u32..64,
        ) {
            let frame = VideoFrame::solid(width, height, [1, 2, 3]);
            let inside = x < width && y < height;
            prop_assert_eq!(frame.get_pixel(x, y).is_some(), inside);
        }
    }
}
