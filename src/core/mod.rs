//! The core module of the recognition pipeline.
//!
//! This module contains the fundamental pieces the rest of the crate builds on:
//! - Tensor aliases
//! - Configuration management
//! - Constants used throughout the pipeline
//! - Error handling
//! - Inference engine integration

pub mod batch;
pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;

pub use batch::{Tensor3D, Tensor4D};
pub use config::{ConfigError, ConfigValidator, OrtSessionConfig};
pub use constants::*;
pub use errors::{OCRError, OcrResult, ProcessingStage};
pub use inference::{InferenceEngine, OrtInfer};
