//! Image and tensor processors for the recognition pipeline.
//!
//! In pipeline order:
//! - [`segmentation`]: page raster to line crops
//! - [`resize_recognition`]: line crop to model height (and width policy)
//! - [`normalization`]: pixels to the input tensor
//! - [`decode`]: model output to text

pub mod decode;
pub mod normalization;
pub mod resize_recognition;
pub mod segmentation;

pub use decode::CTCLabelDecode;
pub use normalization::{NormalizationRange, NormalizeImage};
pub use resize_recognition::{LineResize, ResizePolicy, ResizedLine};
pub use segmentation::{LineSegmenter, SegmenterConfig};
