//! Countdown state machine

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ASSUMED_SPEED_MPS, DISTANCE_PER_VEHICLE_M};

/// Seconds needed to clear `total_vehicles`, rounded down
pub fn seed_for(total_vehicles: u32) -> u32 {
    let queue_length_m = total_vehicles as f64 * DISTANCE_PER_VEHICLE_M;
    (queue_length_m / ASSUMED_SPEED_MPS).floor() as u32
}

/// Countdown state for one video
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownState {
    /// No frame processed yet
    #[default]
    Unset,
    /// Seconds remaining
    Counting(u32),
    /// Countdown ran out; the video session ends
    Expired,
}

/// Outcome of feeding one frame to the estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// First frame: countdown seeded, value after this frame's decrement
    Seeded(u32),
    /// Later frame: countdown after this frame's decrement
    Counting(u32),
    /// Countdown was already zero, or the seed was zero
    Expired,
}

impl Tick {
    /// Remaining seconds to report, `None` once expired
    pub fn remaining(&self) -> Option<u32> {
        match self {
            Tick::Seeded(n) | Tick::Counting(n) => Some(*n),
            Tick::Expired => None,
        }
    }
}

/// One-shot countdown estimator.
///
/// Vehicle totals after the seeding frame do not change the countdown.
#[derive(Debug, Clone, Default)]
pub struct CountdownEstimator {
    state: CountdownState,
}

impl CountdownEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> CountdownState {
        self.state
    }

    /// Remaining seconds while counting
    pub fn remaining(&self) -> Option<u32> {
        match self.state {
            CountdownState::Counting(n) => Some(n),
            _ => None,
        }
    }

    /// Advance by one processed frame carrying `total_vehicles`.
    ///
    /// The seeding frame already counts as one elapsed second.
    pub fn on_frame(&mut self, total_vehicles: u32) -> Tick {
        let tick = match self.state {
            CountdownState::Unset => {
                let seed = seed_for(total_vehicles);
                info!("Countdown set: {} sec ({} vehicles)", seed, total_vehicles);
                match seed {
                    0 => Tick::Expired,
                    n => Tick::Seeded(n - 1),
                }
            }
            CountdownState::Counting(0) | CountdownState::Expired => Tick::Expired,
            CountdownState::Counting(n) => Tick::Counting(n - 1),
        };

        self.state = match tick {
            Tick::Seeded(n) | Tick::Counting(n) => CountdownState::Counting(n),
            Tick::Expired => {
                debug!("Countdown reached 0");
                CountdownState::Expired
            }
        };

        tick
    }

    /// Back to `Unset` for the next video
    pub fn reset(&mut self) {
        self.state = CountdownState::Unset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seed_formula() {
        assert_eq!(seed_for(0), 0);
        assert_eq!(seed_for(1), 2); // 6.5 / 3 = 2.17
        assert_eq!(seed_for(6), 13);
        assert_eq!(seed_for(10), 21); // 65 / 3 = 21.67
    }

    #[test]
    fn test_first_frame_seeds() {
        let mut est = CountdownEstimator::new();
        assert_eq!(est.state(), CountdownState::Unset);
        // Seed 21, first second already elapsed
        assert_eq!(est.on_frame(10), Tick::Seeded(20));
        assert_eq!(est.remaining(), Some(20));
    }

    #[test]
    fn test_later_counts_are_ignored() {
        let mut est = CountdownEstimator::new();
        assert_eq!(est.on_frame(3), Tick::Seeded(5)); // seed 6
        assert_eq!(est.on_frame(100), Tick::Counting(4));
        assert_eq!(est.on_frame(0), Tick::Counting(3));
    }

    #[test]
    fn test_expires_after_zero() {
        let mut est = CountdownEstimator::new();
        assert_eq!(est.on_frame(1), Tick::Seeded(1));
        assert_eq!(est.on_frame(1), Tick::Counting(0));
        assert_eq!(est.on_frame(1), Tick::Expired);
        assert_eq!(est.state(), CountdownState::Expired);
        // Expired is terminal
        assert_eq!(est.on_frame(50), Tick::Expired);
    }

    #[test]
    fn test_zero_seed_expires_on_first_frame() {
        let mut est = CountdownEstimator::new();
        assert_eq!(est.on_frame(0), Tick::Expired);
        assert_eq!(est.state(), CountdownState::Expired);
        assert_eq!(est.on_frame(7), Tick::Expired);
    }

    #[test]
    fn test_reset() {
        let mut est = CountdownEstimator::new();
        est.on_frame(4);
        est.on_frame(4);
        est.reset();
        assert_eq!(est.state(), CountdownState::Unset);
        assert_eq!(est.on_frame(1), Tick::Seeded(1));
    }

    proptest! {
        #[test]
        fn prop_countdown_ticks_down_to_zero(
            first in 0u32..200,
            later in prop::collection::vec(0u32..200, 0..600)
        ) {
            let mut est = CountdownEstimator::new();
            let seed = seed_for(first);

            let mut reported = Vec::new();
            match est.on_frame(first) {
                Tick::Seeded(n) => reported.push(n),
                Tick::Expired => prop_assert_eq!(seed, 0),
                Tick::Counting(_) => prop_assert!(false, "first frame must seed"),
            }

            if !reported.is_empty() {
                for total in later {
                    match est.on_frame(total) {
                        Tick::Counting(n) => reported.push(n),
                        Tick::Expired => break,
                        Tick::Seeded(_) => prop_assert!(false, "seeded twice"),
                    }
                }
            }

            // One less than the seed on the seeding frame, then down by one
            for (i, n) in reported.iter().enumerate() {
                prop_assert_eq!(*n, seed - 1 - i as u32);
            }
        }

        #[test]
        fn prop_session_reports_seed_frames(first in 0u32..100) {
            let mut est = CountdownEstimator::new();
            let mut reported = 0u32;
            while est.on_frame(first) != Tick::Expired {
                reported += 1;
            }
            // seed reported frames (seed - 1 down to 0), then the expiring frame
            prop_assert_eq!(reported, seed_for(first));
        }
    }
}
