//! Playlist driver
//!
//! Plays every video of the playlist in order, over and over, until the quit
//! key is pressed. Each video gets a fresh countdown. One processed frame is
//! followed by one pacing interval, which is what makes a frame count as one
//! second of countdown.

use std::time::Duration;

use metrics::counter;
use signal_link::{SerialStream, SignalLink};
use tokio::io::AsyncWrite;
use tracing::{info, warn};
use vehicle_detect::{ClassTable, Detector};
use video_source::VideoBackend;

use crate::display::{overlay_lines, Viewer, QUIT_KEY};
use crate::playlist::Playlist;
use crate::session::{signal_record, FrameOutcome, SessionEnd, VideoSession};
use crate::settings::AppConfig;

/// Runtime knobs taken from the configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub confidence_threshold: f32,
    /// Sleep after each processed frame
    pub frame_interval: Duration,
    /// Keypress poll timeout
    pub key_poll: Duration,
    /// Square size frames are resized to before detection
    pub frame_size: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for PipelineSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            confidence_threshold: config.detector.confidence_threshold,
            frame_interval: Duration::from_millis(config.pacing.frame_interval_ms),
            key_poll: Duration::from_millis(config.pacing.key_poll_ms),
            frame_size: config.display.frame_size,
        }
    }
}

/// Totals over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed passes over the playlist
    pub traversals: u64,
    /// Videos opened
    pub sessions: u64,
    /// Videos that could not be opened
    pub skipped: u64,
    /// Sessions ended by countdown expiry
    pub expired: u64,
    /// Frames processed and reported
    pub frames: u64,
    /// Records written to the controller
    pub records: u64,
}

/// Owns every pipeline component and the cancellation flag
pub struct PipelineDriver<W = SerialStream> {
    playlist: Playlist,
    backend: Box<dyn VideoBackend>,
    detector: Box<dyn Detector>,
    viewer: Box<dyn Viewer>,
    link: SignalLink<W>,
    classes: ClassTable,
    settings: PipelineSettings,
    cancelled: bool,
    summary: RunSummary,
}

impl<W: AsyncWrite + Unpin> PipelineDriver<W> {
    pub fn new(
        playlist: Playlist,
        backend: Box<dyn VideoBackend>,
        detector: Box<dyn Detector>,
        viewer: Box<dyn Viewer>,
        link: SignalLink<W>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            playlist,
            backend,
            detector,
            viewer,
            link,
            classes: ClassTable::default(),
            settings,
            cancelled: false,
            summary: RunSummary::default(),
        }
    }

    /// Replace the default COCO + emergency class table
    pub fn with_classes(mut self, classes: ClassTable) -> Self {
        self.classes = classes;
        self
    }

    /// Stop before the next frame
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn link(&self) -> &SignalLink<W> {
        &self.link
    }

    /// Loop over the playlist until cancelled
    pub async fn run(&mut self) -> RunSummary {
        info!(
            "Starting playlist of {} videos with {} detector",
            self.playlist.len(),
            self.detector.name()
        );

        while !self.cancelled {
            self.run_traversal().await;
        }

        info!("Pipeline stopped: {:?}", self.summary);
        self.summary
    }

    /// One pass over the playlist
    pub async fn run_traversal(&mut self) {
        if self.cancelled {
            return;
        }
        let frames_before = self.summary.frames;

        while let Some(id) = self.playlist.advance().map(str::to_owned) {
            let session = match VideoSession::open(self.backend.as_mut(), &id) {
                Ok(session) => session,
                Err(e) => {
                    warn!("Skipping video {}: {}", id, e);
                    self.summary.skipped += 1;
                    counter!("traffic_videos_skipped_total").increment(1);
                    continue;
                }
            };

            self.summary.sessions += 1;
            let end = self.run_session(session).await;
            if end == SessionEnd::Expired {
                self.summary.expired += 1;
                counter!("traffic_sessions_expired_total").increment(1);
            }

            // A cancelled pass is not a completed traversal
            if self.cancelled {
                return;
            }
        }

        self.summary.traversals = self.playlist.traversals();

        if self.summary.frames == frames_before && !self.cancelled {
            warn!("No frames processed in this pass over the playlist, retrying");
            tokio::time::sleep(self.settings.frame_interval).await;
            self.poll_quit();
        }
    }

    /// Process frames of one video until it ends
    pub async fn run_session(&mut self, mut session: VideoSession) -> SessionEnd {
        info!("Playing video {}", session.id());

        let end = loop {
            if self.cancelled {
                break SessionEnd::Cancelled;
            }

            let frame = match session.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break SessionEnd::EndOfStream,
                Err(e) => {
                    warn!("Stopping video {}: {}", session.id(), e);
                    break SessionEnd::Failed;
                }
            };

            let size = self.settings.frame_size;
            let frame = match frame.resize(size, size) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Stopping video {}: {}", session.id(), e);
                    break SessionEnd::Failed;
                }
            };

            let detections = match self.detector.detect(&frame) {
                Ok(detections) => detections,
                Err(e) => {
                    warn!("Stopping video {}: {}", session.id(), e);
                    break SessionEnd::Failed;
                }
            };

            let (countdown, counts) =
                match session.evaluate(detections, &self.classes, self.settings.confidence_threshold) {
                    FrameOutcome::Report { countdown, counts } => (countdown, counts),
                    FrameOutcome::Expired => break SessionEnd::Expired,
                };
            self.summary.frames += 1;
            counter!("traffic_frames_processed_total").increment(1);

            if self.link.send(&signal_record(countdown, &counts)).await {
                self.summary.records += 1;
                counter!("traffic_records_sent_total").increment(1);
            }

            if let Err(e) = self.viewer.show(&frame, &overlay_lines(countdown, &counts)) {
                warn!("Display failed: {}", e);
            }

            tokio::time::sleep(self.settings.frame_interval).await;
            self.poll_quit();
        };

        info!(
            "Video {} ended ({:?}) after {} frames",
            session.id(),
            end,
            session.frames()
        );
        end
    }

    fn poll_quit(&mut self) {
        if self.viewer.poll_key(self.settings.key_poll) == Some(QUIT_KEY) {
            info!("Quit requested");
            self.cancelled = true;
        }
    }

    /// Release the display and the serial port
    pub async fn shutdown(&mut self) {
        self.viewer.close();
        self.link.close().await;
    }
}
