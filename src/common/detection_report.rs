use serde::{Deserialize, Serialize};
use crate::common::BayamDetection;

/// Response for one image: the detections plus summary fields.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub model: String,
    pub count: usize,
    pub is_detected: bool,
    /// Highest detection confidence (percent), 0 when nothing was found.
    pub max_confidence: f32,
    pub detections: Vec<BayamDetection>,
}

impl DetectionReport {
    pub fn new(model: &str, detections: Vec<BayamDetection>) -> Self {
        let max_confidence = detections
            .iter()
            .map(|d| d.confidence)
            .fold(0.0f32, f32::max);
        Self {
            model: model.to_string(),
            count: detections.len(),
            is_detected: !detections.is_empty(),
            max_confidence,
            detections,
        }
    }
}
