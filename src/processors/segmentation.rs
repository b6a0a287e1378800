//! Text line segmentation by horizontal projection profile.
//!
//! A page is reduced to a per-row count of ink pixels. After smoothing, rows
//! whose density exceeds a small fraction of the mean positive density are
//! text rows; each maximal run of text rows tall enough to be a line becomes
//! one [`LineSegment`], cropped to its ink columns plus padding.

use crate::core::config::{ConfigError, ConfigValidator};
use crate::core::constants::{
    DEFAULT_GAP_RATIO, DEFAULT_INK_THRESHOLD, DEFAULT_LINE_PADDING, DEFAULT_MIN_LINE_HEIGHT,
    DEFAULT_SMOOTH_WINDOW,
};
use crate::domain::{BoundingBox, LineSegment};
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters of the projection-profile segmenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Pixels with luminance strictly below this value are ink.
    pub ink_threshold: u8,
    /// Moving average window over the row profile. Must be positive; `1`
    /// disables smoothing.
    pub smooth_window: usize,
    /// Minimum height of a band, in rows, to count as a line.
    pub min_line_height: u32,
    /// Pixels added on every side of a line before cropping.
    pub padding: u32,
    /// Fraction of the mean positive row density below which a row is a gap.
    pub gap_ratio: f32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            ink_threshold: DEFAULT_INK_THRESHOLD,
            smooth_window: DEFAULT_SMOOTH_WINDOW,
            min_line_height: DEFAULT_MIN_LINE_HEIGHT,
            padding: DEFAULT_LINE_PADDING,
            gap_ratio: DEFAULT_GAP_RATIO,
        }
    }
}

impl ConfigValidator for SegmenterConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive(self.min_line_height as usize, "min_line_height")?;
        self.validate_positive(self.smooth_window, "smooth_window")?;
        self.validate_f32_range(self.gap_ratio, 0.0, 1.0, "gap_ratio")
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Splits page rasters into text lines, top to bottom.
#[derive(Debug, Clone, Default)]
pub struct LineSegmenter {
    config: SegmenterConfig,
}

impl LineSegmenter {
    /// Creates a segmenter from an explicit configuration.
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Creates a segmenter with default padding, threshold and gap ratio.
    ///
    /// # Arguments
    ///
    /// * `min_line_height` - Minimum band height in rows.
    /// * `smooth_window` - Moving average window (`1` = no smoothing).
    pub fn with_params(min_line_height: u32, smooth_window: usize) -> Self {
        Self::new(SegmenterConfig {
            min_line_height,
            smooth_window,
            ..SegmenterConfig::default()
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Segments a page of any pixel format; color is reduced to luminance first.
    pub fn segment_image(&self, page: &DynamicImage) -> Vec<LineSegment> {
        self.segment(&page.to_luma8())
    }

    /// Segments a grayscale page.
    ///
    /// Returns the lines in the order their bands were found, top to bottom.
    /// A blank page, or one whose ink never forms a tall enough band, yields an
    /// empty vector.
    pub fn segment(&self, page: &GrayImage) -> Vec<LineSegment> {
        let profile = self.smooth(&self.row_profile(page));
        let bands = self.find_bands(&profile);

        let lines: Vec<LineSegment> = bands
            .into_iter()
            .filter_map(|(start, end)| self.extract_line(page, start, end))
            .collect();

        debug!(
            width = page.width(),
            height = page.height(),
            lines = lines.len(),
            "segmented page"
        );
        lines
    }

    /// Ink pixel count for every row of `page`.
    pub fn row_profile(&self, page: &GrayImage) -> Vec<f32> {
        page.rows()
            .map(|row| row.filter(|p| self.is_ink(p.0[0])).count() as f32)
            .collect()
    }

    /// Centered moving average over `hist`.
    ///
    /// Row `i` averages rows `i - w/2 ..= i + w/2` that fall inside the page;
    /// edge rows average over fewer neighbours rather than being padded. An
    /// even window `w` therefore spans `w + 1` rows.
    pub fn smooth(&self, hist: &[f32]) -> Vec<f32> {
        if self.config.smooth_window <= 1 {
            return hist.to_vec();
        }
        let half = self.config.smooth_window / 2;
        (0..hist.len())
            .map(|i| {
                let lo = i.saturating_sub(half);
                let hi = (i + half).min(hist.len() - 1);
                let window = &hist[lo..=hi];
                window.iter().sum::<f32>() / window.len() as f32
            })
            .collect()
    }

    /// Row bands `[start, end)` whose density stays above the gap threshold.
    ///
    /// The threshold is `gap_ratio` times the mean of the strictly positive
    /// values of `profile`. Runs shorter than `min_line_height` are dropped. A
    /// run still open at the bottom edge is closed there.
    pub fn find_bands(&self, profile: &[f32]) -> Vec<(u32, u32)> {
        let (sum, count) = profile
            .iter()
            .filter(|&&v| v > 0.0)
            .fold((0.0f32, 0usize), |(s, c), &v| (s + v, c + 1));
        if count == 0 {
            return Vec::new();
        }
        let gap_threshold = sum / count as f32 * self.config.gap_ratio;

        let mut bands = Vec::new();
        let mut start: Option<u32> = None;
        for (y, &density) in profile.iter().enumerate() {
            let y = y as u32;
            let is_text = density > gap_threshold;
            match (is_text, start) {
                (true, None) => start = Some(y),
                (false, Some(s)) => {
                    self.push_band(&mut bands, s, y);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            self.push_band(&mut bands, s, profile.len() as u32);
        }
        bands
    }

    fn push_band(&self, bands: &mut Vec<(u32, u32)>, start: u32, end: u32) {
        if end - start >= self.config.min_line_height {
            bands.push((start, end));
        }
    }

    #[inline]
    fn is_ink(&self, luma: u8) -> bool {
        luma < self.config.ink_threshold
    }

    /// Crops rows `[start, end)` to their ink columns, padded and clamped to the page.
    fn extract_line(&self, page: &GrayImage, start: u32, end: u32) -> Option<LineSegment> {
        let (width, height) = page.dimensions();
        let mut x_min = u32::MAX;
        let mut x_max = 0u32;
        for y in start..end {
            for x in 0..width {
                if self.is_ink(page.get_pixel(x, y).0[0]) {
                    x_min = x_min.min(x);
                    x_max = x_max.max(x);
                }
            }
        }
        if x_min == u32::MAX {
            return None;
        }

        let pad = self.config.padding;
        let x1 = x_min.saturating_sub(pad);
        let x2 = x_max.saturating_add(1).saturating_add(pad).min(width);
        let y1 = start.saturating_sub(pad);
        let y2 = end.saturating_add(pad).min(height);
        let bbox = BoundingBox::new(x1, y1, x2 - x1, y2 - y1);

        let crop = image::imageops::crop_imm(page, bbox.x, bbox.y, bbox.width, bbox.height);
        Some(LineSegment::new(crop.to_image(), bbox))
    }
}
