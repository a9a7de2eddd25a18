use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use rayon::prelude::*;
use crate::common::{BayamImage, DetectionReport, ModelRegistry};
use crate::data::PipelineConfig;
use crate::detection_processing;
use crate::detection_runners::ort_detector::image_ops::{encode, letterbox};
use crate::error::DetectError;
use crate::{utils, Result};

/// Request-facing entry point: image in, [`DetectionReport`] out.
///
/// Holds no per-request state, so one instance can be shared across
/// threads (or behind an `Arc` across tasks).
#[derive(Debug)]
pub struct Detector {
    registry: ModelRegistry,
    config: PipelineConfig,
}

impl Detector {
    pub fn new(registry: ModelRegistry, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        if registry.is_empty() {
            return Err(DetectError::Config("no models registered".to_string()));
        }
        if let Err(err) = registry.resolve(&config.default_model) {
            return Err(DetectError::Config(format!("default model is not registered: {err}")));
        }
        Ok(Self { registry, config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Decodes an encoded image (PNG, JPEG, ...) and runs it through `model`,
    /// or the configured default when `model` is `None`.
    pub fn detect(&self, bytes: &[u8], model: Option<&str>) -> Result<DetectionReport> {
        let image = BayamImage::from_bytes(bytes)?;
        self.detect_image(&image, model)
    }

    pub fn detect_image(&self, image: &BayamImage, model: Option<&str>) -> Result<DetectionReport> {
        let selector = model.unwrap_or(&self.config.default_model);
        let (version, entry) = self.registry.resolve(selector)?;

        let detect_time = Instant::now();
        let mut elapsed = Duration::ZERO;

        let boxed = letterbox(image, self.config.target_size)?;
        let input = encode(&boxed.canvas)?;
        elapsed = utils::trace("TIME", "Preprocessing input", detect_time, elapsed);

        let output = entry
            .session()
            .infer(&input)
            .map_err(DetectError::Inference)?;
        elapsed = utils::trace("TIME", "Detection run", detect_time, elapsed);

        let names = entry.names().unwrap_or(self.config.names.as_slice());
        let detections = detection_processing::process_predictions(
            &output,
            entry.layout(),
            &boxed.transform,
            &self.config,
            names,
        )?;
        utils::trace("TIME", "Postprocessing", detect_time, elapsed);

        log::debug!(
            "{} found {} detection(s) in {}x{} image",
            version,
            detections.len(),
            image.width(),
            image.height()
        );
        Ok(DetectionReport::new(version.name(), detections))
    }

    /// Runs every image on the rayon pool; results keep the input order.
    pub fn detect_batch(&self, images: &[BayamImage], model: Option<&str>) -> Vec<Result<DetectionReport>> {
        images
            .par_iter()
            .map(|image| self.detect_image(image, model))
            .collect()
    }

    /// [`Detector::detect`] on tokio's blocking pool.
    pub async fn detect_async(self: Arc<Self>, bytes: Vec<u8>, model: Option<String>) -> Result<DetectionReport> {
        tokio::task::spawn_blocking(move || self.detect(&bytes, model.as_deref()))
            .await
            .map_err(|e| DetectError::Inference(anyhow::anyhow!("detection task failed: {e}")))?
    }

    pub async fn detect_path<P: AsRef<Path>>(self: Arc<Self>, path: P, model: Option<String>) -> Result<DetectionReport> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DetectError::invalid(format!("cannot read {}: {e}", path.display())))?;
        self.detect_async(bytes, model).await
    }
}
