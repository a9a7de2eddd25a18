use ndarray::{Array, ArrayView2, Axis, IxDyn};
use crate::error::DetectError;
use crate::Result;

/// Model input/output tensor, wrapper over [`Array<f32, IxDyn>`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct X(pub Array<f32, IxDyn>);

impl From<Array<f32, IxDyn>> for X {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self(x)
    }
}

impl From<Vec<f32>> for X {
    fn from(x: Vec<f32>) -> Self {
        Self(Array::from_vec(x).into_dyn())
    }
}

impl std::ops::Deref for X {
    type Target = Array<f32, IxDyn>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl X {
    pub fn from_shape_vec(shape: &[usize], xs: Vec<f32>) -> Result<Self> {
        Ok(Self::from(Array::from_shape_vec(shape, xs)?))
    }

    pub fn into_inner(self) -> Array<f32, IxDyn> {
        self.0
    }

    /// Drops the batch axis of a `(1, rows, cols)` detection head output.
    pub fn squeeze_batch(&self) -> Result<ArrayView2<'_, f32>> {
        let shape = self.0.shape();
        if shape.len() != 3 || shape[0] != 1 {
            return Err(DetectError::invalid(format!(
                "expected prediction tensor of shape (1, rows, cols), got {shape:?}"
            )));
        }
        Ok(self.0.index_axis(Axis(0), 0).into_dimensionality()?)
    }
}
