use serde::{Deserialize, Serialize};
use crate::common::BayamBox;
use crate::detection_runners::ort_detector::nms::Nms;

/// A decoded prediction in canvas pixel space, before suppression.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub bbox: BayamBox,
    /// Objectness times class score, within `[0, 1]`.
    pub confidence: f32,
    pub class_id: usize,
}

impl Candidate {
    pub fn new(bbox: BayamBox, confidence: f32, class_id: usize) -> Self {
        Self { bbox, confidence, class_id }
    }
}

impl Nms for Candidate {
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    fn confidence(&self) -> f32 {
        self.confidence
    }
}

/// Box relative to the source image, every field within `[0, 1]`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Integer box in source image pixels, for drawing.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl NormalizedBox {
    pub fn to_pixels(&self, orig_w: u32, orig_h: u32) -> PixelBox {
        let (w, h) = (orig_w as f32, orig_h as f32);
        PixelBox {
            x: (self.x * w).round() as i32,
            y: (self.y * h).round() as i32,
            width: (self.width * w).round() as i32,
            height: (self.height * h).round() as i32,
        }
    }
}

/// Final detection returned to callers.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayamDetection {
    #[serde(rename = "class")]
    pub class_label: String,
    pub class_id: usize,
    /// Percentage, rounded to two decimals.
    pub confidence: f32,
    pub bbox_normalized: NormalizedBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox_pixels: Option<PixelBox>,
}

impl BayamDetection {
    pub fn new(class_label: &str, class_id: usize, score: f32, bbox_normalized: NormalizedBox) -> Self {
        Self {
            class_label: class_label.to_string(),
            class_id,
            confidence: to_percent(score),
            bbox_normalized,
            bbox_pixels: None,
        }
    }

    pub fn with_pixels(mut self, orig_w: u32, orig_h: u32) -> Self {
        self.bbox_pixels = Some(self.bbox_normalized.to_pixels(orig_w, orig_h));
        self
    }
}

/// Converts a `[0, 1]` score to a percentage with two decimals.
pub fn to_percent(score: f32) -> f32 {
    ((score as f64 * 100.0 * 100.0).round() / 100.0) as f32
}
