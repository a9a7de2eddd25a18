mod filesystem_access;
mod pipeline_config;
mod service_config;

pub use filesystem_access::FsAccess;
pub use pipeline_config::PipelineConfig;
pub use service_config::{ServiceConfig, CONFIG_FILE};

pub use crate::detection_runners::ort_detector::image_ops::{ImageTransformInfo, Letterbox};
pub use crate::detection_runners::ort_detector::input_wrapper::X;

pub(crate) const CROSS_MARK: &str = "❌";
