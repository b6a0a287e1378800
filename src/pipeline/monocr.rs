//! The recognition pipeline.
//!
//! page → [`LineSegmenter`] → per line: [`LineResize`] → [`NormalizeImage`]
//! → [`InferenceEngine::run`] → [`CTCLabelDecode`] → text.

use super::builder::MonOCRBuilder;
use super::config::MonOCRConfig;
use super::result::{AccuracyReport, BatchResult, LineResult, PageResult};
use super::stats::{PipelineStats, StatsManager};
use crate::core::config::ConfigValidator;
use crate::core::inference::{InferenceEngine, check_input_shape};
use crate::core::{OCRError, OcrResult};
use crate::domain::{BoundingBox, Charset, LineSegment};
use crate::processors::{CTCLabelDecode, LineResize, LineSegmenter, NormalizeImage};
use crate::utils::{PdfRasterizer, calculate_accuracy, load_gray_image};
use image::{DynamicImage, GrayImage};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Mon text recognizer.
///
/// Holds the charset and a shared inference engine for its whole lifetime;
/// everything else is created per line and dropped. `MonOCR` is `Sync`, so
/// one instance can serve a whole batch from the rayon pool.
///
/// # Example
///
/// ```rust,no_run
/// use monocr::pipeline::MonOCR;
///
/// let ocr = MonOCR::builder()
///     .model_path("models/monocr.onnx")
///     .charset_path("models/charset.txt")
///     .build()?;
/// println!("{}", ocr.read_image("page.png")?);
/// # Ok::<(), monocr::core::OCRError>(())
/// ```
pub struct MonOCR {
    engine: Arc<dyn InferenceEngine>,
    segmenter: LineSegmenter,
    resize: LineResize,
    normalize: NormalizeImage,
    decoder: CTCLabelDecode,
    rasterizer: PdfRasterizer,
    parallel_threshold: usize,
    single_line_fallback: bool,
    declared_input: Option<Vec<i64>>,
    stats: StatsManager,
}

impl std::fmt::Debug for MonOCR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonOCR")
            .field("model", &self.engine.model_name())
            .field("segmenter", &self.segmenter)
            .field("resize", &self.resize)
            .field("normalize", &self.normalize)
            .field("decoder", &self.decoder)
            .field("parallel_threshold", &self.parallel_threshold)
            .field("single_line_fallback", &self.single_line_fallback)
            .finish_non_exhaustive()
    }
}

impl MonOCR {
    /// Starts a builder with default configuration.
    pub fn builder() -> MonOCRBuilder {
        MonOCRBuilder::new()
    }

    /// Builds a recognizer from a configuration, resolving the model and
    /// charset from local paths or the model cache.
    pub fn from_config(config: MonOCRConfig) -> OcrResult<Self> {
        MonOCRBuilder::from_config(config).build()
    }

    /// Assembles a recognizer from an engine and charset that are already loaded.
    ///
    /// The `model` section of `config` is ignored.
    ///
    /// # Errors
    ///
    /// `OCRError::ConfigError` if the segmentation or preprocessing settings are invalid.
    pub fn from_parts(
        engine: Arc<dyn InferenceEngine>,
        charset: Arc<Charset>,
        config: &MonOCRConfig,
    ) -> OcrResult<Self> {
        config.segmentation.validate()?;
        config.preprocessing.validate()?;

        let declared_input = engine.input_shape();
        debug!(
            model = engine.model_name(),
            classes = charset.num_classes(),
            ?declared_input,
            "recognizer ready"
        );

        Ok(Self {
            segmenter: LineSegmenter::new(config.segmentation.clone()),
            resize: config.preprocessing.line_resize(),
            normalize: NormalizeImage::new(config.preprocessing.normalization),
            decoder: CTCLabelDecode::new(charset),
            rasterizer: PdfRasterizer::new(),
            parallel_threshold: config.parallel_threshold,
            single_line_fallback: config.single_line_fallback,
            declared_input,
            stats: StatsManager::new(),
            engine,
        })
    }

    /// Replaces the PDF rasterizer.
    pub fn with_pdf_rasterizer(mut self, rasterizer: PdfRasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// The charset used for decoding.
    pub fn charset(&self) -> &Charset {
        self.decoder.charset()
    }

    /// The line segmenter.
    pub fn segmenter(&self) -> &LineSegmenter {
        &self.segmenter
    }

    /// Builds the model input tensor for one line crop.
    pub fn preprocess(&self, line: &GrayImage) -> OcrResult<crate::core::Tensor4D> {
        let resized = self.resize.resize(line)?;
        self.normalize.apply(&resized.image)
    }

    /// Recognizes a single line image.
    ///
    /// # Errors
    ///
    /// * `OCRError::ShapeMismatch` if the tensor does not fit the model's
    ///   declared input, or the output does not fit the charset.
    /// * `OCRError::Inference` if the engine fails.
    pub fn predict_line(&self, line: &GrayImage) -> OcrResult<String> {
        self.recognize(line).map(|(text, _)| text)
    }

    /// Recognizes one line and reports the time spent in the engine.
    fn recognize(&self, line: &GrayImage) -> OcrResult<(String, f64)> {
        let tensor = self.preprocess(line)?;
        if let Some(declared) = &self.declared_input {
            check_input_shape(declared, tensor.shape(), "recognition input")?;
        }

        let start = Instant::now();
        let logits = self.engine.run(&tensor)?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let text = self.decoder.decode_line(&logits)?;
        Ok((text, elapsed_ms))
    }

    /// Recognizes every line of a page image.
    pub fn predict_image(&self, image: &DynamicImage) -> OcrResult<PageResult> {
        self.predict_gray(&image.to_luma8(), None)
    }

    /// Recognizes every line of a grayscale page.
    ///
    /// Lines are recognized in segmentation order. A line that fails is
    /// logged, kept in the result with its error, and left out of
    /// [`PageResult::text`]; the rest of the page still runs. A shape
    /// mismatch is a configuration problem and aborts the page instead.
    pub fn predict_gray(&self, page: &GrayImage, source: Option<PathBuf>) -> OcrResult<PageResult> {
        let (width, height) = page.dimensions();
        let mut segments = self.segmenter.segment(page);
        let mut fallback_used = false;
        if segments.is_empty() && self.single_line_fallback && width > 0 && height > 0 {
            debug!("no lines found, reading the page as one line");
            segments.push(LineSegment::new(
                page.clone(),
                BoundingBox::new(0, 0, width, height),
            ));
            fallback_used = true;
        }

        let mut lines = Vec::with_capacity(segments.len());
        let mut failed = 0usize;
        let mut inference_ms = 0.0;
        for (index, segment) in segments.iter().enumerate() {
            match self.recognize(&segment.image) {
                Ok((text, elapsed_ms)) => {
                    inference_ms += elapsed_ms;
                    lines.push(LineResult {
                        index,
                        bbox: segment.bbox,
                        text,
                        error: None,
                    });
                }
                Err(err @ OCRError::ShapeMismatch { .. }) => {
                    self.stats.record_failed_page();
                    return Err(err);
                }
                Err(err) => {
                    warn!(line = index, bbox = ?segment.bbox, error = %err, "line recognition failed");
                    failed += 1;
                    lines.push(LineResult {
                        index,
                        bbox: segment.bbox,
                        text: String::new(),
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        self.stats.record_page(lines.len(), failed, inference_ms);
        debug!(
            source = ?source,
            lines = lines.len(),
            failed,
            inference_ms,
            "page recognized"
        );

        Ok(PageResult {
            source,
            width,
            height,
            lines,
            fallback_used,
        })
    }

    /// Loads and recognizes one page image file.
    ///
    /// # Errors
    ///
    /// `OCRError::DecodeImage` if the file cannot be read as an image, plus
    /// the page-level errors of [`predict_gray`](Self::predict_gray).
    pub fn predict_page(&self, path: impl AsRef<Path>) -> OcrResult<PageResult> {
        let path = path.as_ref();
        let page = load_gray_image(path).inspect_err(|_| self.stats.record_failed_page())?;
        self.predict_gray(&page, Some(path.to_path_buf()))
    }

    /// Text of one page image file.
    pub fn read_image(&self, path: impl AsRef<Path>) -> OcrResult<String> {
        self.predict_page(path).map(|page| page.text())
    }

    /// Text of each page image file, in input order.
    pub fn read_images<P>(&self, paths: &[P]) -> Vec<OcrResult<String>>
    where
        P: AsRef<Path> + Sync,
    {
        self.predict_batch(paths)
            .into_iter()
            .map(|page| page.map(|page| page.text()))
            .collect()
    }

    /// Recognizes many page images.
    ///
    /// Each document succeeds or fails on its own. Batches larger than the
    /// parallel threshold run on the rayon pool; results always come back in
    /// input order.
    pub fn predict_batch<P>(&self, paths: &[P]) -> BatchResult
    where
        P: AsRef<Path> + Sync,
    {
        let results: BatchResult = if paths.len() > self.parallel_threshold {
            debug!("Using parallel processing for {} pages", paths.len());
            paths
                .par_iter()
                .map(|path| self.predict_page(path))
                .collect()
        } else {
            debug!("Using sequential processing for {} pages", paths.len());
            paths.iter().map(|path| self.predict_page(path)).collect()
        };

        let failed = results.iter().filter(|r| r.is_err()).count();
        for (path, result) in paths.iter().zip(&results) {
            if let Err(err) = result {
                warn!(path = %path.as_ref().display(), error = %err, "page failed");
            }
        }
        info!(
            pages = results.len(),
            failed, "batch recognition finished"
        );
        results
    }

    /// Rasterizes a PDF with the external rasterizer and recognizes every page.
    ///
    /// Pages are returned in document order, each tagged with the PDF path.
    ///
    /// # Errors
    ///
    /// Fails as a whole only if rasterization fails; page errors are per item.
    pub fn read_pdf(&self, path: impl AsRef<Path>) -> OcrResult<BatchResult> {
        let path = path.as_ref();
        let rasterized = self.rasterizer.rasterize(path)?;
        info!(pdf = %path.display(), pages = rasterized.len(), "recognizing PDF");

        let results = self
            .predict_batch(rasterized.pages())
            .into_iter()
            .map(|page| {
                page.map(|mut page| {
                    page.source = Some(path.to_path_buf());
                    page
                })
            })
            .collect();
        Ok(results)
    }

    /// Recognizes a page and scores the text against `ground_truth`.
    pub fn read_image_with_accuracy(
        &self,
        path: impl AsRef<Path>,
        ground_truth: &str,
    ) -> OcrResult<AccuracyReport> {
        let text = self.read_image(path)?;
        let accuracy = calculate_accuracy(&text, ground_truth);
        Ok(AccuracyReport {
            text,
            ground_truth: ground_truth.to_string(),
            accuracy,
        })
    }

    /// Snapshot of the counters accumulated so far.
    pub fn stats(&self) -> PipelineStats {
        self.stats.get_stats()
    }

    /// Zeroes the counters.
    pub fn reset_stats(&self) {
        self.stats.reset_stats();
    }
}
