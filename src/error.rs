use thiserror::Error;

/// Failures surfaced by the detection pipeline.
///
/// An empty detection list is never an error; callers get a report with
/// `count == 0` instead.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Resize error: {0}")]
    Resize(String),

    #[error("Inference error: {0:#}")]
    Inference(anyhow::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl DetectError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DetectError::InvalidInput(msg.into())
    }

    /// True for errors caused by the request itself rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DetectError::InvalidInput(_) | DetectError::UnknownModel(_) | DetectError::ImageDecode(_)
        )
    }
}

impl From<fast_image_resize::ResizeError> for DetectError {
    fn from(err: fast_image_resize::ResizeError) -> Self {
        DetectError::Resize(err.to_string())
    }
}

impl From<fast_image_resize::ImageBufferError> for DetectError {
    fn from(err: fast_image_resize::ImageBufferError) -> Self {
        DetectError::Resize(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DetectError {
    fn from(err: ndarray::ShapeError) -> Self {
        DetectError::InvalidInput(format!("tensor shape: {err}"))
    }
}
