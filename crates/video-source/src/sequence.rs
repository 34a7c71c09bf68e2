//! Image-sequence video backend
//!
//! A video identifier names a directory whose image files, sorted by file
//! name, are the frames of the recording.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::frame::VideoFrame;
use crate::source::{VideoBackend, VideoSource};
use crate::VideoError;

/// File extensions accepted as frames
const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Frame rate assumed when stamping frames
const DEFAULT_FPS: f64 = 30.0;

/// Backend reading directories of still images
#[derive(Debug, Clone)]
pub struct ImageSequenceBackend {
    /// Directory identifiers are resolved against (when relative)
    root: Option<PathBuf>,
    /// Nominal frame rate used for timestamps
    fps: f64,
}

impl ImageSequenceBackend {
    /// Create a backend resolving identifiers relative to the working directory
    pub fn new() -> Self {
        Self {
            root: None,
            fps: DEFAULT_FPS,
        }
    }

    /// Resolve relative identifiers against `root`
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the nominal frame rate
    pub fn with_fps(mut self, fps: f64) -> Self {
        if fps > 0.0 {
            self.fps = fps;
        }
        self
    }

    fn resolve(&self, id: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(id),
            None => PathBuf::from(id),
        }
    }
}

impl Default for ImageSequenceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoBackend for ImageSequenceBackend {
    fn name(&self) -> &'static str {
        "image-sequence"
    }

    fn open(&mut self, id: &str) -> Result<Box<dyn VideoSource>, VideoError> {
        let dir = self.resolve(id);
        let frames = list_frames(&dir).map_err(|e| VideoError::open(id, e.to_string()))?;

        if frames.is_empty() {
            return Err(VideoError::open(id, "directory holds no image frames"));
        }

        info!("Opened image sequence {} ({} frames)", dir.display(), frames.len());

        Ok(Box::new(ImageSequence {
            frames,
            cursor: 0,
            frame_interval_ns: (1e9 / self.fps) as u64,
        }))
    }
}

/// Sorted frame files of a directory
fn list_frames(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_frame_extension(path))
        .collect();
    frames.sort();
    Ok(frames)
}

fn has_frame_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            FRAME_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Open image sequence
struct ImageSequence {
    frames: Vec<PathBuf>,
    cursor: usize,
    frame_interval_ns: u64,
}

impl VideoSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, VideoError> {
        let Some(path) = self.frames.get(self.cursor) else {
            return Ok(None);
        };

        let sequence = self.cursor as u32;
        let image = image::open(path).map_err(|e| VideoError::Read {
            sequence,
            reason: format!("{}: {}", path.display(), e),
        })?;
        self.cursor += 1;

        debug!("Decoded frame {} from {}", sequence, path.display());

        Ok(Some(VideoFrame::from_image(
            image.to_rgb8(),
            sequence as u64 * self.frame_interval_ns,
            sequence,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn write_frames(dir: &Path, names: &[&str]) {
        for (i, name) in names.iter().enumerate() {
            let img = RgbImage::from_pixel(8, 6, image::Rgb([i as u8, 0, 0]));
            img.save(dir.join(name)).unwrap();
        }
    }

    #[test]
    fn test_frames_are_read_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), &["b.png", "a.png", "c.png"]);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut backend = ImageSequenceBackend::new().with_root(dir.path());
        let mut source = backend.open(".").unwrap();

        // a.png was written second (red = 1)
        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.sequence, 0);
        assert_eq!(first.get_pixel(0, 0), Some([1, 0, 0]));
        assert_eq!((first.width, first.height), (8, 6));

        assert!(source.next_frame().unwrap().is_some());
        let third = source.next_frame().unwrap().unwrap();
        assert_eq!(third.get_pixel(0, 0), Some([2, 0, 0]));

        // End-of-stream is distinct from a read failure
        assert!(source.next_frame().unwrap().is_none());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_timestamps_follow_frame_rate() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), &["0.png", "1.png"]);

        let mut backend = ImageSequenceBackend::new().with_fps(10.0);
        let mut source = backend.open(dir.path().to_str().unwrap()).unwrap();

        assert_eq!(source.next_frame().unwrap().unwrap().timestamp_ns, 0);
        assert_eq!(source.next_frame().unwrap().unwrap().timestamp_ns, 100_000_000);
    }

    #[test]
    fn test_missing_directory_cannot_open() {
        let mut backend = ImageSequenceBackend::new();
        let err = backend.open("/definitely/not/here").err().unwrap();
        assert!(matches!(err, VideoError::Open { .. }));
    }

    #[test]
    fn test_empty_directory_cannot_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = ImageSequenceBackend::new().with_root(dir.path());
        assert!(matches!(backend.open("."), Err(VideoError::Open { .. })));
    }

    #[test]
    fn test_corrupt_frame_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0.png"), b"not a png").unwrap();

        let mut backend = ImageSequenceBackend::new().with_root(dir.path());
        let mut source = backend.open(".").unwrap();
        assert!(matches!(source.next_frame(), Err(VideoError::Read { sequence: 0, .. })));
    }
}
