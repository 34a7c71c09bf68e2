//! Vehicle Detection
//!
//! Road scene vehicle counting on top of a pretrained detector:
//! - Class table (COCO categories plus emergency vehicles)
//! - Detector adapter (frame in, per-region class scores out)
//! - Input blob preprocessing
//! - Per-frame vehicle counts and emergency flag

pub mod classes;
pub mod config;
pub mod count;
pub mod detector;
pub mod preprocess;

pub use classes::{ClassTable, VehicleClass};
pub use config::DetectConfig;
pub use count::{count_vehicles, VehicleCount};
pub use detector::{DetectionResult, Detector, OnnxDetector};
pub use preprocess::blob_from_frame;

use thiserror::Error;

/// Detection error types
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}
