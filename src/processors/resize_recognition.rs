//! Resizing line crops to the recognition model's input geometry.
//!
//! Every crop is scaled to the model height with its aspect ratio kept. What
//! happens to the width depends on [`ResizePolicy`]: it is either left as is,
//! or capped and padded with white to a fixed width.

use crate::core::{
    OCRError,
    config::{ConfigError, ConfigValidator},
    constants::{DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH},
};
use image::{GrayImage, Luma, imageops::FilterType};
use serde::{Deserialize, Serialize};

/// Luminance used for padding.
pub const BACKGROUND_LUMA: u8 = 255;

/// How the width of a resized line is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Keep the scaled width; tensors vary in width from line to line.
    Variable,
    /// Cap the scaled width at `target_width`, then pad with white up to it.
    FixedPad {
        /// Width of every produced image.
        target_width: u32,
    },
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self::FixedPad {
            target_width: DEFAULT_TARGET_WIDTH,
        }
    }
}

/// A resized line together with how much of it is content.
#[derive(Debug, Clone)]
pub struct ResizedLine {
    /// Image of height `target_height`, padded if the policy pads.
    pub image: GrayImage,
    /// Width of the scaled crop before any padding.
    pub content_width: u32,
}

/// Scales grayscale line crops to a fixed height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineResize {
    /// Output height in pixels.
    pub target_height: u32,
    /// Width handling.
    pub policy: ResizePolicy,
}

impl Default for LineResize {
    fn default() -> Self {
        Self {
            target_height: DEFAULT_TARGET_HEIGHT,
            policy: ResizePolicy::default(),
        }
    }
}

impl ConfigValidator for LineResize {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive(self.target_height as usize, "target_height")?;
        if let ResizePolicy::FixedPad { target_width } = self.policy {
            self.validate_positive(target_width as usize, "target_width")?;
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

impl LineResize {
    /// Creates a resizer for the given height and policy.
    pub fn new(target_height: u32, policy: ResizePolicy) -> Self {
        Self {
            target_height,
            policy,
        }
    }

    /// Width a `width x height` crop has after scaling to the target height.
    ///
    /// `round(target_height / height * width)`, with halves rounded away from
    /// zero. Never less than one pixel, so extremely flat crops still produce a
    /// valid image.
    pub fn scaled_width(&self, width: u32, height: u32) -> u32 {
        let scale = self.target_height as f64 / height as f64;
        ((width as f64 * scale).round() as u32).max(1)
    }

    /// Width of the image [`resize`](Self::resize) produces for a crop this wide.
    pub fn output_width(&self, width: u32, height: u32) -> u32 {
        match self.policy {
            ResizePolicy::Variable => self.scaled_width(width, height),
            ResizePolicy::FixedPad { target_width } => target_width,
        }
    }

    /// Resizes one crop.
    ///
    /// Bilinear (triangle) filtering is used for the scale step.
    ///
    /// # Errors
    ///
    /// Returns `OCRError::InvalidInput` for a crop with a zero dimension.
    pub fn resize(&self, crop: &GrayImage) -> Result<ResizedLine, OCRError> {
        let (width, height) = crop.dimensions();
        if width == 0 || height == 0 {
            return Err(OCRError::invalid_input(format!(
                "cannot resize an empty line crop ({}x{})",
                width, height
            )));
        }

        let scaled_width = self.scaled_width(width, height);
        match self.policy {
            ResizePolicy::Variable => Ok(ResizedLine {
                image: image::imageops::resize(
                    crop,
                    scaled_width,
                    self.target_height,
                    FilterType::Triangle,
                ),
                content_width: scaled_width,
            }),
            ResizePolicy::FixedPad { target_width } => {
                let content_width = scaled_width.min(target_width);
                let resized = image::imageops::resize(
                    crop,
                    content_width,
                    self.target_height,
                    FilterType::Triangle,
                );
                let mut canvas =
                    GrayImage::from_pixel(target_width, self.target_height, Luma([BACKGROUND_LUMA]));
                image::imageops::replace(&mut canvas, &resized, 0, 0);
                Ok(ResizedLine {
                    image: canvas,
                    content_width,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn test_scaled_width_matches_aspect_ratio() {
        let resize = LineResize::new(64, ResizePolicy::Variable);
        for (width, height) in [(1, 1), (10, 64), (37, 13), (500, 22), (3, 200), (1234, 97)] {
            let expected = (64.0 / height as f64 * width as f64).round() as u32;
            let resized = resize.resize(&gray(width, height, 0)).unwrap();
            assert_eq!(resized.content_width, expected.max(1));
            assert_eq!(resized.image.dimensions(), (expected.max(1), 64));
        }
    }

    #[test]
    fn test_flat_crop_keeps_at_least_one_column() {
        let resize = LineResize::new(64, ResizePolicy::Variable);
        assert_eq!(resize.scaled_width(1, 500), 1);
    }

    #[test]
    fn test_fixed_pad_fills_with_white() {
        let resize = LineResize::new(32, ResizePolicy::FixedPad { target_width: 100 });
        let resized = resize.resize(&gray(20, 16, 0)).unwrap();
        assert_eq!(resized.content_width, 40);
        assert_eq!(resized.image.dimensions(), (100, 32));
        assert_eq!(resized.image.get_pixel(10, 10), &Luma([0]));
        assert_eq!(resized.image.get_pixel(40, 10), &Luma([BACKGROUND_LUMA]));
        assert_eq!(resized.image.get_pixel(99, 31), &Luma([BACKGROUND_LUMA]));
    }

    #[test]
    fn test_fixed_pad_caps_wide_lines() {
        let resize = LineResize::new(64, ResizePolicy::FixedPad { target_width: 1024 });
        let resized = resize.resize(&gray(4000, 64, 0)).unwrap();
        assert_eq!(resized.content_width, 1024);
        assert_eq!(resized.image.dimensions(), (1024, 64));
        assert_eq!(resize.output_width(4000, 64), 1024);
    }

    #[test]
    fn test_empty_crop_rejected() {
        let resize = LineResize::default();
        assert!(matches!(
            resize.resize(&GrayImage::new(0, 10)),
            Err(OCRError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_zero_target_rejected() {
        let resize = LineResize::new(64, ResizePolicy::FixedPad { target_width: 0 });
        assert!(resize.validate().is_err());
        assert!(LineResize::default().validate().is_ok());
    }
}
