//! Bridge to the external `pdftoppm` rasterizer.
//!
//! PDF parsing never happens in-process: the document is handed to poppler's
//! `pdftoppm`, which writes one PNG per page into a temporary directory. The
//! pages are then consumed like any other page image.

use crate::core::constants::DEFAULT_PDF_DPI;
use crate::core::errors::{OCRError, OcrResult, ProcessingStage};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;
use tracing::debug;

/// Runs an external rasterizer over a PDF.
#[derive(Debug, Clone)]
pub struct PdfRasterizer {
    program: PathBuf,
    dpi: u32,
}

/// Page images produced from one PDF.
///
/// The images live in a temporary directory that is removed when this value is dropped.
#[derive(Debug)]
pub struct RasterizedPdf {
    _dir: TempDir,
    pages: Vec<PathBuf>,
}

impl RasterizedPdf {
    /// Page image paths in page order.
    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl Default for PdfRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfRasterizer {
    /// Uses `pdftoppm` from `PATH` at 300 DPI.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("pdftoppm"),
            dpi: DEFAULT_PDF_DPI,
        }
    }

    /// Overrides the rasterizer executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the output resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Rasterizes every page of `pdf_path` to PNG.
    ///
    /// # Errors
    ///
    /// * `OCRError::InvalidInput` if the PDF does not exist.
    /// * `OCRError::Processing` (rasterization stage) if the tool is missing,
    ///   exits unsuccessfully, or produces no pages.
    pub fn rasterize(&self, pdf_path: &Path) -> OcrResult<RasterizedPdf> {
        if !pdf_path.is_file() {
            return Err(OCRError::invalid_input(format!(
                "PDF not found: {}",
                pdf_path.display()
            )));
        }

        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("page");

        let status = Command::new(&self.program)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(pdf_path)
            .arg(&prefix)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                OCRError::processing_error(
                    ProcessingStage::Rasterization,
                    &format!(
                        "failed to invoke '{}'; is poppler-utils installed?",
                        self.program.display()
                    ),
                    e,
                )
            })?;

        if !status.success() {
            return Err(OCRError::processing_message(
                ProcessingStage::Rasterization,
                &format!("rasterizing '{}'", pdf_path.display()),
                &format!("{} exited with {status}", self.program.display()),
            ));
        }

        let pages = collect_pages(dir.path())?;
        if pages.is_empty() {
            return Err(OCRError::processing_message(
                ProcessingStage::Rasterization,
                &format!("rasterizing '{}'", pdf_path.display()),
                "no page images were produced",
            ));
        }
        debug!(pdf = %pdf_path.display(), pages = pages.len(), dpi = self.dpi, "rasterized PDF");

        Ok(RasterizedPdf { _dir: dir, pages })
    }
}

/// Page number from a `pdftoppm` output name such as `page-07.png`.
///
/// The tool zero-pads the number to the width of the page count, so names do
/// not sort numerically across documents and must be parsed.
pub fn page_number(file_name: &str) -> Option<u32> {
    file_name
        .strip_suffix(".png")?
        .rsplit('-')
        .next()?
        .parse()
        .ok()
}

/// PNG files in `dir`, ordered by page number.
fn collect_pages(dir: &Path) -> OcrResult<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let number = page_number(name.to_str()?)?;
            Some((number, entry.path()))
        })
        .collect();
    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_parsing() {
        assert_eq!(page_number("page-1.png"), Some(1));
        assert_eq!(page_number("page-010.png"), Some(10));
        assert_eq!(page_number("page-2.ppm"), None);
        assert_eq!(page_number("notes.txt"), None);
    }

    #[test]
    fn test_collect_pages_sorts_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "stray.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let pages = collect_pages(dir.path()).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["page-1.png", "page-2.png", "page-10.png"]);
    }

    #[test]
    fn test_missing_pdf_is_invalid_input() {
        let result = PdfRasterizer::new().rasterize(Path::new("/nonexistent/doc.pdf"));
        assert!(matches!(result, Err(OCRError::InvalidInput { .. })));
    }

    #[test]
    fn test_missing_program_is_rasterization_error() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();
        let rasterizer = PdfRasterizer::new().with_program(dir.path().join("no-such-tool"));
        match rasterizer.rasterize(&pdf) {
            Err(OCRError::Processing { kind, .. }) => {
                assert_eq!(kind, ProcessingStage::Rasterization)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
