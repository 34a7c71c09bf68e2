//! Traffic Countdown Pipeline
//!
//! Plays a list of recorded traffic videos in a loop, counts vehicles per
//! frame, estimates a traffic light countdown once per video, and streams
//! countdown and counts to a signal controller until the user quits.

pub mod settings;
pub mod display;
pub mod driver;
pub mod playlist;
pub mod session;

#[cfg(feature = "opencv")]
pub mod window;

pub use settings::{AppConfig, ConfigError, DisplayConfig, LogConfig, VideoBackendKind, VideoConfig};
pub use display::{overlay_lines, DisplayError, HeadlessViewer, OverlayText, Viewer, QUIT_KEY};
pub use driver::{PipelineDriver, PipelineSettings, RunSummary};
pub use playlist::Playlist;
pub use session::{signal_record, FrameOutcome, SessionEnd, VideoSession};

#[cfg(feature = "opencv")]
pub use window::WindowViewer;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use video_source::{ImageSequenceBackend, VideoBackend};

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Playlist is empty")]
    EmptyPlaylist,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    #[error("{0} support is not compiled in (enable the `opencv` feature)")]
    Unsupported(&'static str),
}

/// Initialize logging
pub fn init_logging(config: &LogConfig) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

/// Build the configured video backend
pub fn video_backend(config: &VideoConfig) -> Result<Box<dyn VideoBackend>, PipelineError> {
    match config.backend {
        VideoBackendKind::Frames => {
            let mut backend = ImageSequenceBackend::new().with_fps(config.fps);
            if !config.root.is_empty() {
                backend = backend.with_root(&config.root);
            }
            Ok(Box::new(backend))
        }
        #[cfg(feature = "opencv")]
        VideoBackendKind::Opencv => Ok(Box::new(video_source::OpenCvBackend::new())),
        #[cfg(not(feature = "opencv"))]
        VideoBackendKind::Opencv => Err(PipelineError::Unsupported("OpenCV video")),
    }
}

/// Build the configured viewer.
///
/// Must be called inside the runtime: the headless viewer listens for Ctrl-C.
pub fn viewer(config: &DisplayConfig) -> Result<Box<dyn Viewer>, PipelineError> {
    if !config.headless {
        #[cfg(feature = "opencv")]
        return Ok(Box::new(WindowViewer::open(&config.window_name)?));

        #[cfg(not(feature = "opencv"))]
        tracing::warn!("Window display needs the `opencv` feature, running headless");
    }

    let viewer = HeadlessViewer::new();
    viewer.listen_for_ctrl_c();
    Ok(Box::new(viewer))
}
