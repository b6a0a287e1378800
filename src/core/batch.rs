//! Tensor aliases shared by the preprocessing, inference and decoding stages.

/// A 3-dimensional tensor, used for model output `(batch, timesteps, classes)`.
pub type Tensor3D = ndarray::Array3<f32>;

/// A 4-dimensional tensor, used for model input `(batch, channels, height, width)`.
pub type Tensor4D = ndarray::Array4<f32>;

/// Returns the shape of a tensor as signed dimensions, the form ONNX Runtime reports.
pub fn signed_shape(shape: &[usize]) -> Vec<i64> {
    shape.iter().map(|&d| d as i64).collect()
}
