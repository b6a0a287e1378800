//! # monocr
//!
//! Optical character recognition for Mon script.
//!
//! A page image is split into text lines with a horizontal projection
//! profile, each line is scaled and normalized into the tensor the
//! recognition model expects, the model (an ONNX graph run by ONNX Runtime)
//! scores every class at every timestep, and a greedy CTC decode turns those
//! scores into text.
//!
//! ## Modules
//!
//! * [`core`] - Errors, configuration primitives and the inference engine seam
//! * [`domain`] - The charset and line regions
//! * [`processors`] - Segmentation, resizing, normalization and decoding
//! * [`models`] - The model artifact cache and its download transport
//! * [`pipeline`] - The end-to-end recognizer
//! * [`utils`] - Image loading, PDF rasterization, accuracy scoring, logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use monocr::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Downloads the published model into ~/.monocr/models on first use.
//! let ocr = MonOCR::builder().build()?;
//!
//! let page = ocr.predict_page("page.png")?;
//! for line in &page.lines {
//!     println!("{:?}: {}", line.bbox, line.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom engines
//!
//! The pipeline only needs something that implements
//! [`InferenceEngine`](core::InferenceEngine):
//!
//! ```rust
//! use monocr::prelude::*;
//! use monocr::core::{Tensor3D, Tensor4D};
//! use std::sync::Arc;
//!
//! struct Silent;
//!
//! impl InferenceEngine for Silent {
//!     fn run(&self, _input: &Tensor4D) -> OcrResult<Tensor3D> {
//!         Ok(Tensor3D::zeros((1, 8, 3)))
//!     }
//! }
//!
//! let ocr = MonOCR::builder()
//!     .engine(Arc::new(Silent))
//!     .charset(Charset::parse("ab")?)
//!     .build()?;
//! let blank = image::GrayImage::from_pixel(32, 32, image::Luma([255]));
//! let page = image::DynamicImage::ImageLuma8(blank);
//! assert!(ocr.predict_image(&page)?.lines.is_empty());
//! # Ok::<(), OCRError>(())
//! ```

pub mod core;
pub mod domain;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use monocr::prelude::*;
/// ```
///
/// Brings in the recognizer and its builder and config, result types, the
/// inference engine trait, the charset and the error types.
pub mod prelude {
    pub use crate::core::{InferenceEngine, OCRError, OcrResult};
    pub use crate::domain::{BoundingBox, Charset};
    pub use crate::pipeline::{
        ConfigLoader, LineResult, MonOCR, MonOCRBuilder, MonOCRConfig, PageResult,
    };
    pub use crate::processors::{NormalizationRange, ResizePolicy};
    pub use crate::utils::{calculate_accuracy, load_image};
}
