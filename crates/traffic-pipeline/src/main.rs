//! Traffic Countdown - Main Entry Point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use signal_link::SignalLink;
use tracing::info;
use traffic_pipeline::{
    init_logging, video_backend, viewer, AppConfig, PipelineDriver, PipelineSettings, Playlist,
    VideoBackendKind,
};
use vehicle_detect::OnnxDetector;

#[derive(Parser, Debug)]
#[command(
    name = "traffic-countdown",
    version,
    about = "Estimate traffic light countdowns from recorded traffic video"
)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, env = "TRAFFIC_CONFIG")]
    config: Option<PathBuf>,

    /// Video to play; repeat to build the playlist
    #[arg(long = "video", value_name = "ID")]
    videos: Vec<String>,

    /// Video backend
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Detection model (ONNX)
    #[arg(long)]
    model: Option<String>,

    /// Serial port of the signal controller
    #[arg(long)]
    serial_device: Option<String>,

    /// Do not open the serial port
    #[arg(long)]
    no_serial: bool,

    /// Log overlays instead of opening a window
    #[arg(long)]
    headless: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Backend {
    Frames,
    Opencv,
}

impl Cli {
    /// Flags override every other configuration layer
    fn apply(self, config: &mut AppConfig) {
        if !self.videos.is_empty() {
            config.videos = self.videos;
        }
        if let Some(backend) = self.backend {
            config.video.backend = match backend {
                Backend::Frames => VideoBackendKind::Frames,
                Backend::Opencv => VideoBackendKind::Opencv,
            };
        }
        if let Some(model) = self.model {
            config.detector.model_path = model;
        }
        if let Some(device) = self.serial_device {
            config.serial.device = device;
        }
        if self.no_serial {
            config.serial.enabled = false;
        }
        if self.headless {
            config.display.headless = true;
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut config);
    config.validate().context("validating configuration")?;

    init_logging(&config.log).context("installing log subscriber")?;

    info!("=== Traffic Countdown v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Playlist: {:?}", config.videos);

    let link = SignalLink::open(&config.serial).await;

    let detector = OnnxDetector::load(&config.detector)
        .with_context(|| format!("loading detection model {}", config.detector.model_path))?;

    let backend = video_backend(&config.video).context("creating video backend")?;
    let viewer = viewer(&config.display).context("opening display")?;
    let playlist = Playlist::new(config.videos.clone())?;

    let mut driver = PipelineDriver::new(
        playlist,
        backend,
        Box::new(detector),
        viewer,
        link,
        PipelineSettings::from(&config),
    );

    let summary = driver.run().await;
    driver.shutdown().await;

    info!(
        "Done: {} traversals, {} videos played, {} skipped, {} frames, {} records sent",
        summary.traversals, summary.sessions, summary.skipped, summary.frames, summary.records
    );

    Ok(())
}
