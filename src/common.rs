mod bayam_box;
mod bayam_detection;
mod bayam_image;
mod detection_report;
mod inference_device;
mod model_config;
mod model_registry;
mod model_version;

pub use bayam_box::*;
pub use bayam_detection::*;
pub use bayam_image::*;
pub use detection_report::*;
pub use inference_device::*;
pub use model_config::*;
pub use model_registry::*;
pub use model_version::*;
