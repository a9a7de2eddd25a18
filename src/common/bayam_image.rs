use image::{DynamicImage, RgbImage, RgbaImage};
use crate::error::DetectError;
use crate::Result;

/// Decoded RGB image handed to the pipeline. Never empty.
#[derive(Debug, Clone)]
pub struct BayamImage {
    image: RgbImage,
}

impl std::ops::Deref for BayamImage {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl TryFrom<RgbImage> for BayamImage {
    type Error = DetectError;

    fn try_from(image: RgbImage) -> Result<Self> {
        Self::new(image)
    }
}

impl TryFrom<RgbaImage> for BayamImage {
    type Error = DetectError;

    fn try_from(image: RgbaImage) -> Result<Self> {
        Self::new(DynamicImage::from(image).to_rgb8())
    }
}

impl TryFrom<DynamicImage> for BayamImage {
    type Error = DetectError;

    fn try_from(image: DynamicImage) -> Result<Self> {
        Self::new(image.to_rgb8())
    }
}

impl BayamImage {
    pub fn new(image: RgbImage) -> Result<Self> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Err(DetectError::invalid(format!("image has zero size ({w}x{h})")));
        }
        Ok(Self { image })
    }

    /// Decodes encoded image bytes (any format the `image` crate knows).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(DetectError::invalid("empty image payload"));
        }
        let image = image::load_from_memory(data)?;
        Self::try_from(image)
    }

    pub fn get_ratio(&self) -> f32 {
        self.image.width() as f32 / self.image.height() as f32
    }
}
