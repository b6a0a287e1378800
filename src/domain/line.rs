//! Text line regions produced by segmentation.

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the pixel `(px, py)` lies inside the box.
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

/// One text line cut out of a page.
///
/// The crop is an owned copy: changing the page afterwards does not affect it.
#[derive(Debug, Clone)]
pub struct LineSegment {
    /// Grayscale pixels of the line, including padding.
    pub image: GrayImage,
    /// Where the crop came from on the page.
    pub bbox: BoundingBox,
}

impl LineSegment {
    pub fn new(image: GrayImage, bbox: BoundingBox) -> Self {
        Self { image, bbox }
    }
}
