mod utils;
mod detectors;
mod error;
mod send_channels;
pub mod common;
pub mod data;
pub mod detection_processing;
pub mod detection_runners;

use std::time::Instant;
use crate::common::{DetectionReport, ModelConfig, ModelEntry, ModelRegistry};
use crate::data::{ServiceConfig, CROSS_MARK};
use crate::detection_runners::OrtEngine;

pub use crate::detectors::Detector;
pub use crate::error::DetectError;
pub use crate::send_channels::{DetectionPool, QUEUE_DEPTH};

pub type Result<T, E = DetectError> = std::result::Result<T, E>;

/// Loads one ONNX Runtime session per model config.
pub fn init_registry(models: &[ModelConfig]) -> anyhow::Result<ModelRegistry> {
    let mut builder = ModelRegistry::builder();
    for model_details in models {
        log::info!("Initializing ORT session: {}", model_details);
        let engine = OrtEngine::new(model_details)?;
        let mut entry = ModelEntry::new(engine, model_details.layout);
        if let Some(labels_path) = &model_details.labels_path {
            let labels = utils::file_to_vec(labels_path)
                .map_err(|e| anyhow::anyhow!("{CROSS_MARK} Failed to read labels {labels_path}: {e}"))?;
            entry = entry.with_names(labels);
        }
        builder = builder.with_model(model_details.version, entry)?;
    }
    Ok(builder.build())
}

pub fn init_detector(service_config: &ServiceConfig) -> anyhow::Result<Detector> {
    let registry = init_registry(&service_config.models)?;
    let detector = Detector::new(registry, service_config.pipeline.clone())?;
    log::info!("Detector ready with models {:?}", detector.registry().versions());
    Ok(detector)
}

pub fn run_detection(detector: &Detector, image_bytes: &[u8], model: Option<&str>) -> Result<DetectionReport> {
    let now = Instant::now();

    let report = detector.detect(image_bytes, model)?;

    log::debug!("Processing time: {:?}", now.elapsed());

    Ok(report)
}
