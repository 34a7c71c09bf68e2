//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! config file, then `TRAFFIC__SECTION__KEY` environment variables.
//! Command line flags are applied last by the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};
use signal_link::LinkConfig;
use thiserror::Error;
use vehicle_detect::DetectConfig;

/// Config file looked up when none is given (any supported extension)
pub const DEFAULT_CONFIG_FILE: &str = "traffic-countdown";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TRAFFIC";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Video decoding backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoBackendKind {
    /// Directories of image frames
    Frames,
    /// Video files decoded by OpenCV
    Opencv,
}

/// Video source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub backend: VideoBackendKind,
    /// Directory relative identifiers are resolved against (frames backend)
    pub root: String,
    /// Nominal frame rate for image sequences
    pub fps: f64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            backend: if cfg!(feature = "opencv") {
                VideoBackendKind::Opencv
            } else {
                VideoBackendKind::Frames
            },
            root: String::new(),
            fps: 30.0,
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Log overlays instead of opening a window
    pub headless: bool,
    /// Window title
    pub window_name: String,
    /// Frames are resized to this square size before detection and display
    pub frame_size: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            headless: !cfg!(feature = "opencv"),
            window_name: "Traffic Detection".to_string(),
            frame_size: 600,
        }
    }
}

/// Frame pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Sleep after each processed frame; one frame stands for this much countdown time
    pub frame_interval_ms: u64,
    /// Keypress poll timeout
    pub key_poll_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 1000,
            key_poll_ms: 1,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Maximum level: trace, debug, info, warn, error
    pub level: String,
    /// Emit JSON lines
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Video identifiers, played in order and looped
    pub videos: Vec<String>,
    pub video: VideoConfig,
    pub detector: DetectConfig,
    pub serial: LinkConfig,
    pub display: DisplayConfig,
    pub pacing: PacingConfig,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            videos: vec![
                "traffic cars.mp4".to_string(),
                "traffic cars5.mp4".to_string(),
                "traffic cars7.mp4".to_string(),
            ],
            video: VideoConfig::default(),
            detector: DetectConfig::default(),
            serial: LinkConfig::default(),
            display: DisplayConfig::default(),
            pacing: PacingConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load defaults, config file, and environment.
    ///
    /// An explicit `path` must exist; otherwise `traffic-countdown.*` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Self::load_from(file, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(
        file: config::File<config::FileSourceFile, config::FileFormat>,
        env: config::Environment,
    ) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(file)
            .add_source(
                env.prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("videos")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the pipeline relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.videos.is_empty() {
            return Err(ConfigError::Invalid("at least one video is required".into()));
        }
        if !(0.0..=1.0).contains(&self.detector.confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "confidence_threshold {} outside [0, 1]",
                self.detector.confidence_threshold
            )));
        }
        if self.detector.input_size == 0 || self.display.frame_size == 0 {
            return Err(ConfigError::Invalid("frame sizes must be positive".into()));
        }
        if self.pacing.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid("frame_interval_ms must be positive".into()));
        }
        Ok(())
    }
}
