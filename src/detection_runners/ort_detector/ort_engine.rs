use anyhow::{anyhow, Result};
use half::f16;
use parking_lot::Mutex;
use ort::{
    execution_providers::{
        CPUExecutionProvider,
        CUDAExecutionProvider,
        CoreMLExecutionProvider,
        ExecutionProviderDispatch,
        TensorRTExecutionProvider,
    },
    session::builder::GraphOptimizationLevel,
    session::Session,
    value::Tensor,
};
use crate::common::{InferenceDevice, ModelConfig};
use crate::data::{CROSS_MARK, X};
use crate::detection_runners::Inference;
use crate::utils;

/// ONNXRuntime Backend
///
/// `Session::run` needs exclusive access, so concurrent requests on the same
/// engine queue on the mutex. Register one engine per worker to run them in
/// parallel.
pub struct OrtEngine {
    session: Mutex<Session>,
    device: InferenceDevice,
    output_name: String,
    names: Option<Vec<String>>,
}

impl std::fmt::Debug for OrtEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtEngine")
            .field("device", &self.device)
            .field("output_name", &self.output_name)
            .field("names", &self.names)
            .finish()
    }
}

impl OrtEngine {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        if !config.ort_lib_path.is_empty() {
            ort::init_from(&config.ort_lib_path)
                .commit()
                .map_err(|e| anyhow!("{CROSS_MARK} Failed to commit ORT from {}: {e}", config.ort_lib_path))?;
        }

        let device = config.inference_device;
        let session = Session::builder()
            .map_err(|e| anyhow!("Failed to create session builder: {e}"))?
            .with_execution_providers([Self::execution_provider(device)])
            .map_err(|e| anyhow!("{CROSS_MARK} {device} initialization failed: {e}"))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| anyhow!("Failed to set optimization level: {e}"))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| anyhow!("Failed to set intra-thread count: {e}"))?
            .commit_from_file(&config.weights_path)
            .map_err(|e| anyhow!("Failed to load model {}: {e}", config.weights_path))?;

        let output_name = match session.outputs.first() {
            Some(output) => output.name.clone(),
            None => anyhow::bail!("Model {} declares no outputs", config.weights_path),
        };

        let names = Self::fetch_names(&session);
        log::info!(
            "Backend: ONNXRuntime | Model: {} | Device: {} | Output: {} | Classes: {}",
            config.version,
            device,
            output_name,
            names.as_ref().map_or(0, |n| n.len()),
        );

        Ok(Self {
            session: Mutex::new(session),
            device,
            output_name,
            names,
        })
    }

    fn execution_provider(device: InferenceDevice) -> ExecutionProviderDispatch {
        match device {
            InferenceDevice::CPU => CPUExecutionProvider::default().build(),
            InferenceDevice::CUDA(device_id) => CUDAExecutionProvider::default()
                .with_device_id(device_id as i32)
                .build(),
            InferenceDevice::TensorRT(device_id) => TensorRTExecutionProvider::default()
                .with_device_id(device_id as i32)
                .build(),
            InferenceDevice::CoreML => CoreMLExecutionProvider::default().build(),
        }
    }

    // names live in the onnx metadata as `{0: 'bayam', 1: 'other'}`
    fn fetch_names(session: &Session) -> Option<Vec<String>> {
        let raw = session.metadata().ok()?.custom("names").ok()??;
        match utils::parse_names(&raw) {
            Ok(names) if !names.is_empty() => Some(names),
            Ok(_) => None,
            Err(err) => {
                log::warn!("Ignoring unparsable model names {raw:?}: {err}");
                None
            }
        }
    }
}

impl Inference for OrtEngine {
    fn infer(&self, xs: &X) -> Result<X> {
        let input = Tensor::from_array(xs.0.clone())
            .map_err(|e| anyhow!("Failed to create input tensor: {e}"))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| anyhow!("Inference failed: {e}"))?;

        let output = &outputs[self.output_name.as_str()];
        let ys = match output.try_extract_array::<f32>() {
            Ok(view) => view.into_owned(),
            Err(_) => output
                .try_extract_array::<f16>()
                .map_err(|e| anyhow!("Failed to extract output '{}': {e}", self.output_name))?
                .mapv(f16::to_f32),
        };

        Ok(X::from(ys))
    }

    fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }
}
