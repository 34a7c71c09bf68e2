//! Countdown record wire format

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::wire::{SEPARATOR, TERMINATOR};

/// One record sent per processed frame.
///
/// Field order on the wire: countdown, car, motorbike, bus, truck,
/// ambulance, fire engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// Remaining seconds
    pub countdown: u32,
    pub car: u32,
    pub motorbike: u32,
    pub bus: u32,
    pub truck: u32,
    pub ambulance: u32,
    pub fire_engine: u32,
}

impl SignalRecord {
    /// Fields in wire order
    pub fn fields(&self) -> [u32; 7] {
        [
            self.countdown,
            self.car,
            self.motorbike,
            self.bus,
            self.truck,
            self.ambulance,
            self.fire_engine,
        ]
    }

    /// Newline-terminated line as written to the port
    pub fn to_line(&self) -> String {
        format!("{}{}", self, TERMINATOR)
    }
}

impl fmt::Display for SignalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields().iter().enumerate() {
            if i > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}
