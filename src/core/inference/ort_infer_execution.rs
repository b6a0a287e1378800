use super::*;
use crate::core::batch::{Tensor3D, Tensor4D};
use crate::core::constants::DEFAULT_OUTPUT_NAME;
use crate::core::errors::{OcrResult, SimpleError};
use crate::core::inference::InferenceEngine;
use ndarray::ArrayView3;
use ort::value::TensorRef;

impl OrtInfer {
    /// Returns the configured output name, else `"output"` if the model
    /// declares it, else the model's first output.
    fn get_output_name(&self) -> Result<String, OCRError> {
        if let Some(ref name) = self.output_name {
            return Ok(name.clone());
        }
        let session = self.sessions[0].lock().map_err(|_| self.lock_error(0))?;
        session
            .outputs
            .iter()
            .find(|output| output.name == DEFAULT_OUTPUT_NAME)
            .or_else(|| session.outputs.first())
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                OCRError::inference_error(
                    &self.model_name,
                    "No outputs available in session",
                    SimpleError::new("model may be invalid or corrupted"),
                )
            })
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &std::path::Path {
        &self.model_path
    }

    fn run_inference_with_processor<T>(
        &self,
        x: &Tensor4D,
        processor: impl FnOnce(&[i64], &[f32]) -> Result<T, OCRError>,
    ) -> Result<T, OCRError> {
        let input_shape = x.shape().to_vec();
        let output_name = self.get_output_name()?;

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            OCRError::inference_error(
                &self.model_name,
                &format!("Failed to convert input tensor with shape {:?}", input_shape),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self
            .next_idx
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| self.lock_error(idx))?;

        if !session_guard.outputs.iter().any(|o| o.name == output_name) {
            return Err(OCRError::inference_error(
                &self.model_name,
                &format!("Output tensor '{}' is not declared by the model", output_name),
                SimpleError::new("missing output"),
            ));
        }

        let outputs = session_guard.run(inputs).map_err(|e| {
            OCRError::inference_error(
                &self.model_name,
                &format!(
                    "ONNX Runtime inference failed with input '{}' {:?} -> output '{}'",
                    self.input_name, input_shape, output_name
                ),
                e,
            )
        })?;

        let output = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                OCRError::inference_error(
                    &self.model_name,
                    &format!("Failed to extract output tensor '{}' as f32", output_name),
                    e,
                )
            })?;
        let (output_shape, output_data) = output;

        processor(output_shape, output_data)
    }

    /// Runs the model and returns its `(batch, timesteps, classes)` output.
    pub fn infer_3d(&self, x: &Tensor4D) -> Result<Tensor3D, OCRError> {
        self.run_inference_with_processor(x, |output_shape, output_data| {
            if output_shape.len() != 3 {
                return Err(OCRError::shape_mismatch(
                    format!("output of model '{}'", self.model_name),
                    &[1, -1, -1],
                    output_shape,
                ));
            }

            let batch_size_out = output_shape[0] as usize;
            let seq_len = output_shape[1] as usize;
            let num_classes = output_shape[2] as usize;

            let array_view =
                ArrayView3::from_shape((batch_size_out, seq_len, num_classes), output_data)
                    .map_err(OCRError::Tensor)?;
            Ok(array_view.to_owned())
        })
    }
}

impl InferenceEngine for OrtInfer {
    fn run(&self, input: &Tensor4D) -> OcrResult<Tensor3D> {
        self.infer_3d(input)
    }

    fn input_shape(&self) -> Option<Vec<i64>> {
        self.primary_input_shape()
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
