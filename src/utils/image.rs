//! Utility functions for image loading and conversion.

use crate::core::OCRError;
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// Converts a DynamicImage to a GrayImage.
///
/// Color inputs are reduced to luminance with the `image` crate's Rec. 709
/// weights; alpha is dropped.
pub fn dynamic_to_gray(img: DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Loads an image from a file path without converting it.
///
/// # Errors
///
/// Returns `OCRError::DecodeImage` if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> Result<DynamicImage, OCRError> {
    image::open(path).map_err(|e| OCRError::decode_image(path, e))
}

/// Loads an image from a file path and converts it to 8-bit grayscale.
///
/// # Arguments
///
/// * `path` - A reference to the path of the image file to load
///
/// # Returns
///
/// * `Ok(GrayImage)` - The loaded luminance image
/// * `Err(OCRError)` - An error if the image could not be loaded
pub fn load_gray_image(path: &Path) -> Result<GrayImage, OCRError> {
    load_image(path).map(dynamic_to_gray)
}

/// Decodes an in-memory encoded image (PNG, JPEG, ...) to grayscale.
pub fn decode_gray_image(bytes: &[u8]) -> Result<GrayImage, OCRError> {
    image::load_from_memory(bytes)
        .map(dynamic_to_gray)
        .map_err(|e| OCRError::decode_image(Path::new("<memory>"), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn test_dynamic_to_gray_keeps_black_and_white() {
        let mut rgb = RgbImage::from_pixel(4, 2, Rgb([255, 255, 255]));
        rgb.put_pixel(1, 1, Rgb([0, 0, 0]));
        let gray = dynamic_to_gray(DynamicImage::ImageRgb8(rgb));
        assert_eq!(gray.dimensions(), (4, 2));
        assert_eq!(gray.get_pixel(0, 0), &Luma([255]));
        assert_eq!(gray.get_pixel(1, 1), &Luma([0]));
    }

    #[test]
    fn test_load_gray_image_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        GrayImage::from_pixel(3, 3, Luma([7])).save(&path).unwrap();
        let loaded = load_gray_image(&path).unwrap();
        assert_eq!(loaded.get_pixel(2, 2), &Luma([7]));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            load_gray_image(&path),
            Err(OCRError::DecodeImage { .. })
        ));
        assert!(matches!(
            decode_gray_image(b"junk"),
            Err(OCRError::DecodeImage { .. })
        ));
    }
}
