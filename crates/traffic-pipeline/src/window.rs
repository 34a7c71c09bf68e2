//! OpenCV window viewer

use std::time::Duration;

use opencv::{
    core::{self, Mat},
    highgui, imgproc,
    prelude::*,
};
use tracing::{info, warn};
use video_source::VideoFrame;

use crate::display::{DisplayError, OverlayText, Viewer};

/// Desktop window showing annotated frames
pub struct WindowViewer {
    name: String,
}

impl WindowViewer {
    pub fn open(name: &str) -> Result<Self, DisplayError> {
        highgui::named_window(name, highgui::WINDOW_AUTOSIZE).map_err(|e| DisplayError::Open {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        info!("Opened display window '{}'", name);
        Ok(Self {
            name: name.to_string(),
        })
    }

    fn render(&self, frame: &VideoFrame, overlay: &[OverlayText]) -> opencv::Result<()> {
        let rgb = Mat::from_slice(&frame.data)?
            .reshape(3, frame.height as i32)?
            .try_clone()?;
        let mut bgr = Mat::default();
        imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;

        for line in overlay {
            let [b, g, r] = line.color_bgr;
            imgproc::put_text(
                &mut bgr,
                &line.text,
                core::Point::new(line.origin.0, line.origin.1),
                imgproc::FONT_HERSHEY_SIMPLEX,
                line.scale,
                core::Scalar::new(b as f64, g as f64, r as f64, 0.0),
                line.thickness,
                imgproc::LINE_8,
                false,
            )?;
        }

        highgui::imshow(&self.name, &bgr)
    }
}

impl Viewer for WindowViewer {
    fn show(&mut self, frame: &VideoFrame, overlay: &[OverlayText]) -> Result<(), DisplayError> {
        self.render(frame, overlay)
            .map_err(|e| DisplayError::Render(e.to_string()))
    }

    fn poll_key(&mut self, wait: Duration) -> Option<char> {
        let delay = (wait.as_millis() as i32).max(1);
        match highgui::wait_key(delay) {
            Ok(key) if key >= 0 => char::from_u32((key & 0xFF) as u32),
            Ok(_) => None,
            Err(e) => {
                warn!("Key poll failed: {}", e);
                None
            }
        }
    }

    fn close(&mut self) {
        if let Err(e) = highgui::destroy_all_windows() {
            warn!("Failed to close display window '{}': {}", self.name, e);
        }
    }
}
