use serde::{Deserialize, Serialize};
use crate::common::inference_device::InferenceDevice;
use crate::common::model_version::{ModelVersion, PredsLayout};

/// How to load one model into the registry.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub version: ModelVersion,
    pub weights_path: String,
    /// Path to the onnxruntime shared library; the system one is used when empty.
    #[serde(default)]
    pub ort_lib_path: String,
    /// One label per line; falls back to the model metadata, then the pipeline names.
    #[serde(default)]
    pub labels_path: Option<String>,
    #[serde(default)]
    pub inference_device: InferenceDevice,
    #[serde(default)]
    pub layout: PredsLayout,
    #[serde(default = "default_threads")]
    pub intra_threads: usize,
}

fn default_threads() -> usize {
    1
}

impl ModelConfig {
    pub fn new(version: ModelVersion, weights_path: &str) -> Self {
        Self {
            version,
            weights_path: weights_path.to_string(),
            intra_threads: default_threads(),
            ..Default::default()
        }
    }

    pub fn with_ort_lib_path(mut self, path: &str) -> Self {
        self.ort_lib_path = path.to_string();
        self
    }

    pub fn with_labels_path(mut self, path: &str) -> Self {
        self.labels_path = Some(path.to_string());
        self
    }

    pub fn with_device(mut self, device: InferenceDevice) -> Self {
        self.inference_device = device;
        self
    }

    pub fn with_layout(mut self, layout: PredsLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl std::fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Model: {}\n\
            Weights File Path: {}\n\
            Labels Path: {}\n\
            OnnxRuntime Lib Path: {}\n\
            Inference Device: {}\n\
            Output Layout: {:?}",
            self.version,
            self.weights_path,
            self.labels_path.as_deref().unwrap_or("-"),
            self.ort_lib_path,
            self.inference_device,
            self.layout,
        )
    }
}
