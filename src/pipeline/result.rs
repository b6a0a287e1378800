//! Recognition results.

use crate::core::OcrResult;
use crate::domain::BoundingBox;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Outcome of recognizing one segmented line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineResult {
    /// Position in reading order, starting at zero.
    pub index: usize,
    /// Region of the page the line was cropped from.
    pub bbox: BoundingBox,
    /// Decoded text; empty when recognition failed.
    pub text: String,
    /// Why recognition failed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LineResult {
    /// Whether the line was recognized.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Recognition output for one page image.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageResult {
    /// File the page was read from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    /// Lines top to bottom. Empty for a blank page.
    pub lines: Vec<LineResult>,
    /// Set when no lines were found and the page was read as a single line.
    pub fallback_used: bool,
}

impl PageResult {
    /// Page text: recognized lines joined with `\n`, failed lines left out.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .filter(|line| line.is_ok())
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Lines whose recognition failed.
    pub fn failed_lines(&self) -> impl Iterator<Item = &LineResult> {
        self.lines.iter().filter(|line| !line.is_ok())
    }

    /// Whether segmentation found no lines.
    pub fn is_blank(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for PageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Recognized text scored against a reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub text: String,
    pub ground_truth: String,
    /// Similarity percentage in `[0, 100]`.
    pub accuracy: f64,
}

/// Per-document results of a batch, in input order.
pub type BatchResult = Vec<OcrResult<PageResult>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn line(index: usize, text: &str, error: Option<&str>) -> LineResult {
        LineResult {
            index,
            bbox: BoundingBox::new(0, index as u32 * 20, 10, 10),
            text: text.to_string(),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_text_skips_failed_lines() {
        let page = PageResult {
            lines: vec![
                line(0, "a", None),
                line(1, "", Some("inference failed")),
                line(2, "b", None),
            ],
            ..PageResult::default()
        };
        assert_eq!(page.text(), "a\nb");
        assert_eq!(page.failed_lines().count(), 1);
        assert_eq!(page.to_string(), "a\nb");
    }

    #[test]
    fn test_blank_page_has_empty_text() {
        let page = PageResult::default();
        assert!(page.is_blank());
        assert_eq!(page.text(), "");
    }

    #[test]
    fn test_json_omits_absent_error() {
        let json = serde_json::to_value(line(0, "a", None)).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["bbox"]["y"], 0);

        let json = serde_json::to_value(line(1, "", Some("boom"))).unwrap();
        assert_eq!(json["error"], "boom");
    }
}
