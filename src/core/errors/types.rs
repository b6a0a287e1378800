//! Error type definitions for the recognition pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Stage of the pipeline in which a processing error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Resizing a line crop to the model height.
    Resize,
    /// Converting pixels into the model input tensor.
    Normalization,
    /// CTC decoding of the model output.
    Decoding,
    /// Rasterizing a PDF into page images.
    Rasterization,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::Decoding => write!(f, "decoding"),
            ProcessingStage::Rasterization => write!(f, "rasterization"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Errors produced anywhere in the recognition pipeline.
///
/// The first four variants are the failure kinds callers are expected to
/// branch on: a download may be retried, a decode failure is fatal for one
/// document, a shape mismatch is a configuration bug, and an inference
/// failure is fatal for one line. A blank page is not an error; it yields an
/// empty line list.
#[derive(Error, Debug)]
pub enum OCRError {
    /// Fetching a remote artifact failed (network, HTTP status or filesystem).
    #[error("download of '{url}' failed: {context}")]
    Download {
        /// Remote location that was being fetched.
        url: String,
        /// What went wrong.
        context: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An input raster could not be read or parsed.
    #[error("failed to decode image '{}'", path.display())]
    DecodeImage {
        /// Path of the offending image.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },

    /// A tensor does not have the shape the next stage requires.
    #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Where the mismatch was detected.
        context: String,
        /// Expected dimensions (`-1` marks a dynamic axis).
        expected: Vec<i64>,
        /// Dimensions actually seen.
        actual: Vec<i64>,
    },

    /// The inference engine rejected or failed a call.
    #[error("inference failed for model '{model_name}': {context}")]
    Inference {
        /// Name of the model that was running.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// Underlying engine error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A processing stage failed.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// A minimal string-backed error used as a `source` where no richer error exists.
#[derive(Debug, Clone)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SimpleError {}
