//! Display and keypress boundary

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};
use vehicle_detect::{VehicleClass, VehicleCount};
use video_source::VideoFrame;

/// Key that ends the pipeline
pub const QUIT_KEY: char = 'q';

const GREEN: [u8; 3] = [0, 255, 0];
const BLUE: [u8; 3] = [255, 0, 0];
const YELLOW: [u8; 3] = [0, 255, 255];

const LINE_THICKNESS: i32 = 2;

/// Display errors
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("Cannot open window {name}: {reason}")]
    Open { name: String, reason: String },

    #[error("Failed to render frame: {0}")]
    Render(String),
}

/// One line of overlay text
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayText {
    pub text: String,
    /// Bottom-left corner of the text in pixels
    pub origin: (i32, i32),
    pub scale: f64,
    /// Color in BGR order
    pub color_bgr: [u8; 3],
    pub thickness: i32,
}

impl OverlayText {
    fn new(text: String, y: i32, scale: f64, color_bgr: [u8; 3]) -> Self {
        Self {
            text,
            origin: (10, y),
            scale,
            color_bgr,
            thickness: LINE_THICKNESS,
        }
    }
}

/// Overlay for one frame: countdown first, then one line per vehicle class
pub fn overlay_lines(countdown: u32, counts: &VehicleCount) -> Vec<OverlayText> {
    let mut lines = vec![OverlayText::new(
        format!("Countdown: {} sec", countdown),
        50,
        1.0,
        GREEN,
    )];

    let mut y = 80;
    for (class, count) in counts.iter() {
        let color = if class.is_emergency() { YELLOW } else { BLUE };
        lines.push(OverlayText::new(
            format!("{}: {}", caption(class), count),
            y,
            0.5,
            color,
        ));
        y += 30;
    }
    lines
}

fn caption(class: VehicleClass) -> &'static str {
    match class {
        VehicleClass::Car => "Cars",
        VehicleClass::Motorbike => "Bikes",
        VehicleClass::Bus => "Buses",
        VehicleClass::Truck => "Trucks",
        VehicleClass::Ambulance => "Ambulances",
        VehicleClass::FireEngine => "Fire Engines",
    }
}

/// Frame display and keyboard input
pub trait Viewer {
    /// Render a frame with its overlay
    fn show(&mut self, frame: &VideoFrame, overlay: &[OverlayText]) -> Result<(), DisplayError>;

    /// Wait up to `wait` for a keypress
    fn poll_key(&mut self, wait: Duration) -> Option<char>;

    /// Release display resources
    fn close(&mut self);
}

impl<V: Viewer + ?Sized> Viewer for Box<V> {
    fn show(&mut self, frame: &VideoFrame, overlay: &[OverlayText]) -> Result<(), DisplayError> {
        (**self).show(frame, overlay)
    }

    fn poll_key(&mut self, wait: Duration) -> Option<char> {
        (**self).poll_key(wait)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Viewer without a window.
///
/// Overlays go to the debug log. An interrupt (Ctrl-C) reads as the quit key.
#[derive(Debug, Clone, Default)]
pub struct HeadlessViewer {
    interrupt: Arc<AtomicBool>,
    frames_shown: u64,
}

impl HeadlessViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag that makes the next `poll_key` return the quit key
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Spawn a task turning Ctrl-C into the quit key. Needs a tokio runtime.
    pub fn listen_for_ctrl_c(&self) {
        let interrupt = self.interrupt_handle();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupt received, stopping after the current frame");
                    interrupt.store(true, Ordering::SeqCst);
                }
                Err(e) => warn!("Cannot listen for Ctrl-C: {}", e),
            }
        });
    }

    /// Frames passed to `show`
    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }
}

impl Viewer for HeadlessViewer {
    fn show(&mut self, frame: &VideoFrame, overlay: &[OverlayText]) -> Result<(), DisplayError> {
        self.frames_shown += 1;
        let text: Vec<&str> = overlay.iter().map(|line| line.text.as_str()).collect();
        debug!(
            "Frame {} ({}x{}): {}",
            frame.sequence,
            frame.width,
            frame.height,
            text.join(" | ")
        );
        Ok(())
    }

    fn poll_key(&mut self, _wait: Duration) -> Option<char> {
        self.interrupt
            .load(Ordering::SeqCst)
            .then_some(QUIT_KEY)
    }

    fn close(&mut self) {
        debug!("Headless viewer closed after {} frames", self.frames_shown);
    }
}
