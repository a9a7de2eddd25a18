use crate::detection_runners::ort_detector::input_wrapper::X;

/// Opaque model execution: letterboxed `(1, 3, N, N)` tensor in, raw
/// detection head out.
///
/// Implementations must be safe to call from several request threads at
/// once; sessions that are not serialize internally.
pub trait Inference: Send + Sync {
    fn infer(&self, xs: &X) -> anyhow::Result<X>;

    /// Class names embedded in the model, if any.
    fn names(&self) -> Option<&[String]> {
        None
    }
}

impl<T: Inference + ?Sized> Inference for std::sync::Arc<T> {
    fn infer(&self, xs: &X) -> anyhow::Result<X> {
        (**self).infer(xs)
    }

    fn names(&self) -> Option<&[String]> {
        (**self).names()
    }
}

impl<T: Inference + ?Sized> Inference for Box<T> {
    fn infer(&self, xs: &X) -> anyhow::Result<X> {
        (**self).infer(xs)
    }

    fn names(&self) -> Option<&[String]> {
        (**self).names()
    }
}
