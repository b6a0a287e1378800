//! Structures and helpers for running the recognition model.
//!
//! The pipeline only talks to the model through [`InferenceEngine`], a
//! `run(tensor) -> tensor` capability. [`OrtInfer`] is the ONNX Runtime
//! implementation; tests and alternative backends provide their own.

pub mod ort_infer;
pub mod session;

pub use ort_infer::OrtInfer;
pub use session::build_session;

use crate::core::{
    batch::{Tensor3D, Tensor4D, signed_shape},
    errors::{OCRError, OcrResult},
};

/// The opaque model contract: a `(1, 1, H, W)` line tensor in, `(1, T, C)` logits out.
///
/// Implementations must be safe to share across the batch worker pool. If the
/// backend cannot run concurrent calls on one handle it must serialize them
/// internally (`OrtInfer` keeps a pool of mutex-guarded sessions).
pub trait InferenceEngine: Send + Sync {
    /// Runs one forward pass.
    fn run(&self, input: &Tensor4D) -> OcrResult<Tensor3D>;

    /// Declared input dimensions, `-1` for dynamic axes. `None` if unknown.
    fn input_shape(&self) -> Option<Vec<i64>> {
        None
    }

    /// Human readable model name used in logs and errors.
    fn model_name(&self) -> &str {
        "model"
    }
}

/// Checks a tensor against the dimensions an engine declared.
///
/// Dynamic axes (any negative value) match every size. A rank difference or a
/// disagreeing static axis is a [`OCRError::ShapeMismatch`]; the tensor is never
/// resized to make it fit.
pub fn check_input_shape(declared: &[i64], actual: &[usize], context: &str) -> OcrResult<()> {
    let actual = signed_shape(actual);
    let compatible = declared.len() == actual.len()
        && declared
            .iter()
            .zip(&actual)
            .all(|(&want, &got)| want < 0 || want == got);
    if compatible {
        Ok(())
    } else {
        Err(OCRError::shape_mismatch(context, declared, &actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_width_accepts_any_width() {
        assert!(check_input_shape(&[1, 1, 64, -1], &[1, 1, 64, 317], "input").is_ok());
        assert!(check_input_shape(&[-1, 1, 64, -1], &[1, 1, 64, 5], "input").is_ok());
    }

    #[test]
    fn test_static_axis_disagreement_is_rejected() {
        let err = check_input_shape(&[1, 1, 64, 1024], &[1, 1, 64, 900], "input").unwrap_err();
        match err {
            OCRError::ShapeMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, vec![1, 1, 64, 1024]);
                assert_eq!(actual, vec![1, 1, 64, 900]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rank_difference_is_rejected() {
        assert!(check_input_shape(&[1, 64, -1], &[1, 1, 64, 10], "input").is_err());
    }
}
