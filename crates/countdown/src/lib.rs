//! Countdown Estimation
//!
//! Per-video countdown policy:
//! - Seeded once from the first processed frame's vehicle total
//! - Decremented by one per processed frame, the seeding frame included
//! - Expires on the frame after reaching zero, or at once on a zero seed
//!
//! One processed frame stands for one second of real time. The pipeline
//! paces frames with a fixed one-second sleep to keep that approximation.

mod estimator;

pub use estimator::{seed_for, CountdownEstimator, CountdownState, Tick};

/// Queue length occupied by one vehicle (meters)
pub const DISTANCE_PER_VEHICLE_M: f64 = 6.5;

/// Speed at which the queue is assumed to clear (meters/second)
pub const ASSUMED_SPEED_MPS: f64 = 3.0;
