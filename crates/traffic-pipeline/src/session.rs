//! Per-video session state

use countdown::{CountdownEstimator, Tick};
use signal_link::SignalRecord;
use tracing::debug;
use vehicle_detect::{count_vehicles, ClassTable, DetectionResult, VehicleClass, VehicleCount};
use video_source::{VideoBackend, VideoError, VideoFrame, VideoSource};

/// Why a video session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Source ran out of frames
    EndOfStream,
    /// Countdown reached zero and another frame arrived, or the seed was zero
    Expired,
    /// Quit requested
    Cancelled,
    /// Read, detection or display setup failure
    Failed,
}

/// Result of evaluating one frame's detections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Report and render these values
    Report { countdown: u32, counts: VehicleCount },
    /// Session is over; nothing is reported for this frame
    Expired,
}

/// One pass over one video, with its own countdown
pub struct VideoSession {
    id: String,
    source: Box<dyn VideoSource>,
    estimator: CountdownEstimator,
    frames: u64,
}

impl VideoSession {
    pub fn new(id: &str, source: Box<dyn VideoSource>) -> Self {
        Self {
            id: id.to_string(),
            source,
            estimator: CountdownEstimator::new(),
            frames: 0,
        }
    }

    /// Open `id` on `backend` with a fresh countdown
    pub fn open(backend: &mut dyn VideoBackend, id: &str) -> Result<Self, VideoError> {
        let source = backend.open(id)?;
        Ok(Self::new(id, source))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Frames reported so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn estimator(&self) -> &CountdownEstimator {
        &self.estimator
    }

    /// Next decoded frame, `None` at end of stream
    pub fn next_frame(&mut self) -> Result<Option<VideoFrame>, VideoError> {
        self.source.next_frame()
    }

    /// Aggregate detections and advance the countdown
    pub fn evaluate<I>(&mut self, detections: I, classes: &ClassTable, threshold: f32) -> FrameOutcome
    where
        I: IntoIterator<Item = DetectionResult>,
    {
        let counts = count_vehicles(detections, classes, threshold);
        match self.estimator.on_frame(counts.total()) {
            Tick::Expired => {
                debug!("{}: countdown expired after {} frames", self.id, self.frames);
                FrameOutcome::Expired
            }
            Tick::Seeded(countdown) | Tick::Counting(countdown) => {
                self.frames += 1;
                debug!(
                    "{}: countdown {} sec, {} vehicles{}",
                    self.id,
                    countdown,
                    counts.total(),
                    if counts.emergency_detected() { ", emergency vehicle in view" } else { "" }
                );
                FrameOutcome::Report { countdown, counts }
            }
        }
    }
}

/// Record for the signal controller
pub fn signal_record(countdown: u32, counts: &VehicleCount) -> SignalRecord {
    SignalRecord {
        countdown,
        car: counts.get(VehicleClass::Car),
        motorbike: counts.get(VehicleClass::Motorbike),
        bus: counts.get(VehicleClass::Bus),
        truck: counts.get(VehicleClass::Truck),
        ambulance: counts.get(VehicleClass::Ambulance),
        fire_engine: counts.get(VehicleClass::FireEngine),
    }
}
