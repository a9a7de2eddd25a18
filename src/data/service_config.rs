use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::common::ModelConfig;
use crate::data::{FsAccess, PipelineConfig};

pub const CONFIG_FILE: &str = "models.json";

/// Everything needed to stand up a [`crate::Detector`], usually read from
/// `<config_dir>/bayam/models.json`.
///
/// ```json
/// {
///   "pipeline": { "conf_threshold": 0.25, "iou_threshold": 0.45 },
///   "models": [
///     { "version": "yolo9", "weights_path": "models/yolo9.onnx" },
///     { "version": "yolo11", "weights_path": "models/yolo11.onnx", "inference_device": "cuda:0" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub models: Vec<ModelConfig>,
}

impl ServiceConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: ServiceConfig = serde_json::from_str(json)?;
        if config.models.is_empty() {
            anyhow::bail!("service config lists no models");
        }
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        FsAccess::Config.file(CONFIG_FILE)
    }

    /// Reads the config from [`ServiceConfig::default_path`].
    pub fn load_default() -> anyhow::Result<Self> {
        let path = Self::default_path()?;
        log::info!("Loading service config from {}", path.display());
        Self::from_file(path)
    }
}
