//! Detection configuration

use serde::{Deserialize, Serialize};

/// Detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// ONNX model path
    pub model_path: String,

    /// Minimum class confidence for a detection to count (exclusive)
    pub confidence_threshold: f32,

    /// Square model input size in pixels
    pub input_size: u32,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            model_path: "yolov3.onnx".to_string(),
            confidence_threshold: 0.5,
            input_size: 416,
        }
    }
}
