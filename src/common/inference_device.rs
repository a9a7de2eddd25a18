use serde::{Deserialize, Serialize};

/// Execution provider a model session runs on. Device ids apply to GPU providers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InferenceDevice {
    #[default] CPU,
    CUDA(usize),
    TensorRT(usize),
    CoreML,
}

const DEVICE_NAMES: [&str; 4] = ["cpu", "cuda", "tensorrt", "coreml"];

impl InferenceDevice {
    fn from_name(device: &str, device_id: usize) -> Option<Self> {
        match device.to_lowercase().as_str() {
            "cpu" => Some(InferenceDevice::CPU),
            "cuda" => Some(InferenceDevice::CUDA(device_id)),
            "tensorrt" => Some(InferenceDevice::TensorRT(device_id)),
            "coreml" => Some(InferenceDevice::CoreML),
            _ => None,
        }
    }

    /// Parses `"cpu"`, `"cuda"`, `"cuda:1"`, `"tensorrt:0"` and so on.
    pub fn parse(device: &str) -> Option<Self> {
        match device.split_once(':') {
            Some((name, id)) => Self::from_name(name.trim(), id.trim().parse().ok()?),
            None => Self::from_name(device.trim(), 0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => DEVICE_NAMES[0],
            InferenceDevice::CUDA(_) => DEVICE_NAMES[1],
            InferenceDevice::TensorRT(_) => DEVICE_NAMES[2],
            InferenceDevice::CoreML => DEVICE_NAMES[3],
        }
    }
}

impl std::fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceDevice::CUDA(id) | InferenceDevice::TensorRT(id) => {
                write!(f, "{}:{}", self.name(), id)
            }
            _ => f.write_str(self.name()),
        }
    }
}

impl TryFrom<String> for InferenceDevice {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| {
            format!("unknown inference device '{value}', expected one of {:?}", DEVICE_NAMES)
        })
    }
}

impl From<InferenceDevice> for String {
    fn from(device: InferenceDevice) -> Self {
        device.to_string()
    }
}
