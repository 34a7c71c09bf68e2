//! Detector adapter: one frame in, per-region class scores out

use std::path::Path;

use tracing::{debug, error, info};
use tract_onnx::prelude::*;
use video_source::VideoFrame;

use crate::preprocess::blob_from_frame;
use crate::{DetectConfig, DetectError};

/// Leading box fields in a YOLO output row: cx, cy, w, h, objectness
const BOX_FIELDS: usize = 5;

/// One candidate region of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    /// Score per known class, in class table order
    pub scores: Vec<f32>,
}

impl DetectionResult {
    pub fn new(scores: Vec<f32>) -> Self {
        Self { scores }
    }

    /// Highest scoring class id and its score.
    ///
    /// Ties resolve to the lowest class id; `None` for an empty score vector.
    pub fn best_class(&self) -> Option<(usize, f32)> {
        self.scores
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (id, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((id, score)),
            })
    }
}

/// Black-box object detector
pub trait Detector {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Run detection on one frame
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<DetectionResult>, DetectError>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<DetectionResult>, DetectError> {
        (**self).detect(frame)
    }
}

/// YOLO-style ONNX detector running on tract
pub struct OnnxDetector {
    model: TypedRunnableModel<TypedModel>,
    input_size: u32,
}

impl OnnxDetector {
    /// Load and optimize the model named by `config`
    pub fn load(config: &DetectConfig) -> Result<Self, DetectError> {
        let path = Path::new(&config.model_path);
        info!("Loading detection model from {}", path.display());

        let size = config.input_size as usize;
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, 3, size, size]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                error!("Failed to load detection model: {}", e);
                DetectError::ModelLoad(format!("{}: {}", path.display(), e))
            })?;

        info!("Detection model ready ({}x{} input)", size, size);
        Ok(Self {
            model,
            input_size: config.input_size,
        })
    }
}

impl Detector for OnnxDetector {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<DetectionResult>, DetectError> {
        let blob = blob_from_frame(frame, self.input_size)?;
        let size = self.input_size as usize;
        let data = blob
            .as_slice()
            .ok_or_else(|| DetectError::InvalidFrame("input blob is not contiguous".into()))?;
        let input = Tensor::from_shape(&[1, 3, size, size], data)
            .map_err(|e| DetectError::Inference(e.to_string()))?;

        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| DetectError::Inference(e.to_string()))?;

        let mut detections = Vec::new();
        for output in outputs.iter() {
            let view = output
                .to_array_view::<f32>()
                .map_err(|e| DetectError::Inference(e.to_string()))?;
            let row_len = view.shape().last().copied().unwrap_or(0);
            let values: Vec<f32> = view.iter().copied().collect();
            detections.extend(rows_to_detections(&values, row_len));
        }

        debug!("Frame {}: {} candidate regions", frame.sequence, detections.len());
        Ok(detections)
    }
}

/// Split flat YOLO output rows into class-score vectors
fn rows_to_detections(values: &[f32], row_len: usize) -> Vec<DetectionResult> {
    if row_len <= BOX_FIELDS {
        return Vec::new();
    }
    values
        .chunks_exact(row_len)
        .map(|row| DetectionResult::new(row[BOX_FIELDS..].to_vec()))
        .collect()
}
