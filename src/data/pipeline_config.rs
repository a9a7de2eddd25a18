use serde::{Deserialize, Serialize};
use crate::error::DetectError;
use crate::Result;

/// Post-processing settings shared by every model in a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Side of the square model input.
    pub target_size: u32,
    /// Candidates scoring below this are dropped; equal scores are kept.
    pub conf_threshold: f32,
    /// Boxes overlapping a kept box by more than this are suppressed.
    pub iou_threshold: f32,
    /// Keep only this class id, `None` keeps every class.
    pub target_class: Option<usize>,
    /// Fallback labels when the model carries none.
    pub names: Vec<String>,
    /// Also report integer boxes in source pixels.
    pub emit_pixels: bool,
    /// Selector used when a request names no model.
    pub default_model: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_size: 640,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            target_class: Some(0),
            names: vec!["bayam".to_string()],
            emit_pixels: false,
            default_model: "yolo11".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_target_size(mut self, n: u32) -> Self {
        self.target_size = n;
        self
    }

    pub fn with_conf(mut self, x: f32) -> Self {
        self.conf_threshold = x;
        self
    }

    pub fn with_iou(mut self, x: f32) -> Self {
        self.iou_threshold = x;
        self
    }

    pub fn with_target_class(mut self, class_id: Option<usize>) -> Self {
        self.target_class = class_id;
        self
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|x| x.to_string()).collect();
        self
    }

    pub fn with_pixels(mut self, x: bool) -> Self {
        self.emit_pixels = x;
        self
    }

    pub fn with_default_model(mut self, name: &str) -> Self {
        self.default_model = name.to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_size == 0 {
            return Err(DetectError::invalid("target_size must be positive"));
        }
        if !(0.0..=1.0).contains(&self.conf_threshold) {
            return Err(DetectError::invalid(format!(
                "conf_threshold {} is outside [0, 1]",
                self.conf_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(DetectError::invalid(format!(
                "iou_threshold {} is outside [0, 1]",
                self.iou_threshold
            )));
        }
        Ok(())
    }
}
