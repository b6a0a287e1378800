//! Pixel normalization into the recognition input tensor.
//!
//! The value range is a property of the trained model. Feeding the wrong range
//! does not fail; it silently degrades every prediction, so the range must be
//! set from the model's documentation, never guessed.

use crate::core::{OCRError, Tensor4D};
use image::GrayImage;
use ndarray::Array4;
use serde::{Deserialize, Serialize};

/// Target numeric range for pixel intensities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationRange {
    /// `value / 255`
    ZeroToOne,
    /// `value / 127.5 - 1`
    #[default]
    MinusOneToOne,
}

/// Converts a grayscale line into a `(1, 1, H, W)` tensor.
///
/// Each value is mapped as `value * alpha + beta`.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeImage {
    /// Scaling factor.
    pub alpha: f32,
    /// Offset added after scaling.
    pub beta: f32,
    range: NormalizationRange,
}

impl Default for NormalizeImage {
    fn default() -> Self {
        Self::new(NormalizationRange::default())
    }
}

impl NormalizeImage {
    /// Creates a normalizer for `range`.
    pub fn new(range: NormalizationRange) -> Self {
        let (alpha, beta) = match range {
            NormalizationRange::ZeroToOne => (1.0 / 255.0, 0.0),
            NormalizationRange::MinusOneToOne => (1.0 / 127.5, -1.0),
        };
        Self { alpha, beta, range }
    }

    /// The configured range.
    pub fn range(&self) -> NormalizationRange {
        self.range
    }

    /// Normalized value of a single luminance level.
    #[inline]
    pub fn normalize_value(&self, luma: u8) -> f32 {
        luma as f32 * self.alpha + self.beta
    }

    /// Builds the model input tensor for one line.
    ///
    /// # Errors
    ///
    /// Returns `OCRError::InvalidInput` for an empty image.
    pub fn apply(&self, img: &GrayImage) -> Result<Tensor4D, OCRError> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(OCRError::invalid_input(
                "cannot normalize an empty line image",
            ));
        }
        let data: Vec<f32> = img.as_raw().iter().map(|&v| self.normalize_value(v)).collect();
        Ok(Array4::from_shape_vec(
            (1, 1, height as usize, width as usize),
            data,
        )?)
    }
}
