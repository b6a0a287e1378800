//! Configuration management for the recognition pipeline.
//!
//! This module provides ONNX Runtime session settings, configuration error
//! types and the validation trait shared by every config struct.

pub mod errors;
pub mod onnx;

pub use errors::{ConfigError, ConfigValidator};
pub use onnx::*;
