//! Error types for the recognition pipeline.
//!
//! # Usage
//!
//! ```rust
//! use monocr::core::errors::{OCRError, ProcessingStage};
//!
//! let error = OCRError::shape_mismatch("recognition input", &[1, 1, 64, 1024], &[1, 1, 64, 900]);
//! assert!(!error.is_retryable());
//!
//! let config_error = OCRError::config_error("Missing charset");
//! let stage_error = OCRError::processing_message(ProcessingStage::Decoding, "line 0", "no classes");
//! # let _ = (config_error, stage_error);
//! ```

pub mod constructors;
pub mod types;

pub use types::{OCRError, ProcessingStage, SimpleError};

/// Convenient result alias for OCR operations.
pub type OcrResult<T> = Result<T, OCRError>;
