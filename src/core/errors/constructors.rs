//! Constructor helpers for [`OCRError`].
//!
//! These keep call sites short and make sure every error carries enough
//! context to be understood from a log line alone.

use super::types::{OCRError, ProcessingStage, SimpleError};
use std::path::Path;

impl OCRError {
    /// Creates a download error without an underlying source.
    pub fn download_error(url: &str, context: impl Into<String>) -> Self {
        Self::Download {
            url: url.to_string(),
            context: context.into(),
            source: None,
        }
    }

    /// Creates a download error wrapping the cause.
    ///
    /// # Arguments
    ///
    /// * `url` - Remote location being fetched.
    /// * `context` - What the fetch was doing when it failed.
    /// * `error` - The underlying transport or filesystem error.
    pub fn download_failed(
        url: &str,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Download {
            url: url.to_string(),
            context: context.into(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates an image decode error for `path`.
    pub fn decode_image(path: &Path, error: image::ImageError) -> Self {
        Self::DecodeImage {
            path: path.to_path_buf(),
            source: error,
        }
    }

    /// Creates a shape mismatch error.
    ///
    /// # Arguments
    ///
    /// * `context` - Where the mismatch was detected.
    /// * `expected` - Expected dimensions; `-1` marks a dynamic axis.
    /// * `actual` - Dimensions actually observed.
    pub fn shape_mismatch(context: impl Into<String>, expected: &[i64], actual: &[i64]) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Creates an inference error for `model_name`.
    pub fn inference_error(
        model_name: &str,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a processing error for the given stage.
    ///
    /// # Arguments
    ///
    /// * `kind` - The stage of processing where the error occurred.
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn processing_error(
        kind: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a processing error whose cause is just a message.
    pub fn processing_message(kind: ProcessingStage, context: &str, message: &str) -> Self {
        Self::processing_error(kind, context, SimpleError::new(message))
    }

    /// Creates an OCRError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an OCRError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates an error for a model that could not be loaded into a session.
    pub fn model_load_error(path: &Path, reason: &str, error: ort::Error) -> Self {
        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model");
        Self::Inference {
            model_name: model_name.to_string(),
            context: format!("{} (model path '{}')", reason, path.display()),
            source: Box::new(error),
        }
    }

    /// Returns `true` for failures a caller may reasonably retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Download { .. })
    }
}

impl From<crate::core::config::ConfigError> for OCRError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message() {
        let err = OCRError::shape_mismatch("recognition input", &[1, 1, 64, -1], &[1, 3, 64, 200]);
        let message = err.to_string();
        assert!(message.contains("recognition input"));
        assert!(message.contains("[1, 1, 64, -1]"));
        assert!(message.contains("[1, 3, 64, 200]"));
    }

    #[test]
    fn test_only_download_is_retryable() {
        assert!(OCRError::download_error("https://example.invalid/m.onnx", "status 503").is_retryable());
        assert!(!OCRError::invalid_input("empty").is_retryable());
        assert!(!OCRError::shape_mismatch("x", &[1], &[2]).is_retryable());
    }

    #[test]
    fn test_processing_message_carries_stage() {
        let err = OCRError::processing_message(ProcessingStage::Decoding, "line 3", "bad logits");
        assert_eq!(err.to_string(), "decoding failed: line 3");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("bad logits"));
    }
}
