//! Builder for [`MonOCR`].

use super::config::MonOCRConfig;
use super::monocr::MonOCR;
use crate::core::config::{ConfigValidator, OrtSessionConfig};
use crate::core::inference::{InferenceEngine, OrtInfer};
use crate::core::{OCRError, OcrResult};
use crate::domain::Charset;
use crate::models::{ArtifactFetcher, ModelCache};
use crate::processors::{NormalizationRange, ResizePolicy, SegmenterConfig};
use crate::utils::PdfRasterizer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Builder for the recognition pipeline.
///
/// Every setter maps onto a [`MonOCRConfig`] field. The model and charset are
/// resolved in [`build`](Self::build), in this order of preference:
///
/// 1. an explicitly supplied engine / charset,
/// 2. a configured local path,
/// 3. the model cache, downloading on first use.
#[derive(Default)]
pub struct MonOCRBuilder {
    config: MonOCRConfig,
    charset: Option<Arc<Charset>>,
    engine: Option<Arc<dyn InferenceEngine>>,
    fetcher: Option<Arc<dyn ArtifactFetcher>>,
    rasterizer: Option<PdfRasterizer>,
}

impl MonOCRBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder starting from `config`.
    pub fn from_config(config: MonOCRConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The configuration collected so far.
    pub fn config(&self) -> &MonOCRConfig {
        &self.config
    }

    /// Sets a local model file.
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model.model_path = Some(path.into());
        self
    }

    /// Sets a local charset file.
    pub fn charset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model.charset_path = Some(path.into());
        self
    }

    /// Uses an already loaded charset.
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = Some(Arc::new(charset));
        self
    }

    /// Sets the directory downloaded artifacts are cached in.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.model.cache_dir = Some(dir.into());
        self
    }

    /// Overrides the model download location.
    pub fn model_url(mut self, url: impl Into<String>) -> Self {
        self.config.model.model_url = url.into();
        self
    }

    /// Overrides the charset download location.
    pub fn charset_url(mut self, url: impl Into<String>) -> Self {
        self.config.model.charset_url = url.into();
        self
    }

    /// Sets the model's input tensor name.
    pub fn input_name(mut self, name: impl Into<String>) -> Self {
        self.config.model.input_name = Some(name.into());
        self
    }

    /// Sets the model's output tensor name.
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.config.model.output_name = Some(name.into());
        self
    }

    /// Sets the number of ONNX Runtime sessions.
    ///
    /// Concurrent batch workers share these sessions; more sessions means
    /// less lock contention at the cost of memory.
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.config.model.session_pool_size = size;
        self
    }

    /// Sets ONNX Runtime session options.
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.config.model.ort_session = Some(config);
        self
    }

    /// Replaces all segmentation settings.
    pub fn segmenter_config(mut self, config: SegmenterConfig) -> Self {
        self.config.segmentation = config;
        self
    }

    /// Sets the minimum line height in rows.
    pub fn min_line_height(mut self, rows: u32) -> Self {
        self.config.segmentation.min_line_height = rows;
        self
    }

    /// Sets the row profile smoothing window.
    pub fn smooth_window(mut self, window: usize) -> Self {
        self.config.segmentation.smooth_window = window;
        self
    }

    /// Sets the padding added around each line.
    pub fn line_padding(mut self, pixels: u32) -> Self {
        self.config.segmentation.padding = pixels;
        self
    }

    /// Sets the model input height.
    pub fn target_height(mut self, height: u32) -> Self {
        self.config.preprocessing.target_height = height;
        self
    }

    /// Sets the width handling of resized lines.
    pub fn resize_policy(mut self, policy: ResizePolicy) -> Self {
        self.config.preprocessing.resize_policy = policy;
        self
    }

    /// Sets the pixel value range the model expects.
    pub fn normalization(mut self, range: NormalizationRange) -> Self {
        self.config.preprocessing.normalization = range;
        self
    }

    /// Batches larger than this run in parallel.
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.config.parallel_threshold = threshold;
        self
    }

    /// Reads a page with no detected lines as a single line.
    pub fn single_line_fallback(mut self, enabled: bool) -> Self {
        self.config.single_line_fallback = enabled;
        self
    }

    /// Uses a custom inference engine instead of loading an ONNX model.
    pub fn engine(mut self, engine: Arc<dyn InferenceEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Uses a custom transport for cache downloads.
    pub fn fetcher(mut self, fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Uses a custom PDF rasterizer.
    pub fn pdf_rasterizer(mut self, rasterizer: PdfRasterizer) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// Validates the configuration, resolves the model and charset, and
    /// builds the pipeline.
    ///
    /// # Errors
    ///
    /// * `OCRError::ConfigError` for invalid settings or an empty charset.
    /// * `OCRError::InvalidInput` if a charset file cannot be read.
    /// * `OCRError::Download` if an artifact had to be fetched and could not be.
    /// * `OCRError::Inference` if the model cannot be loaded.
    pub fn build(self) -> OcrResult<MonOCR> {
        self.config.validate()?;
        let model = &self.config.model;

        let charset = match (self.charset.clone(), &model.charset_path) {
            (Some(charset), _) => charset,
            (None, Some(path)) => Arc::new(Charset::from_file(path)?),
            (None, None) => {
                let path = self.model_cache()?.ensure(&model.charset_artifact())?;
                Arc::new(Charset::from_file(&path)?)
            }
        };

        let engine: Arc<dyn InferenceEngine> = match self.engine.clone() {
            Some(engine) => engine,
            None => {
                let path = match &model.model_path {
                    Some(path) => path.clone(),
                    None => self.model_cache()?.ensure(&model.model_artifact())?,
                };
                info!(model = %path.display(), "loading recognition model");
                Arc::new(OrtInfer::from_config(
                    &path,
                    model.input_name.as_deref(),
                    model.output_name.as_deref(),
                    model.session_pool_size,
                    model.ort_session.as_ref(),
                )?)
            }
        };

        let ocr = MonOCR::from_parts(engine, charset, &self.config)?;
        Ok(match self.rasterizer {
            Some(rasterizer) => ocr.with_pdf_rasterizer(rasterizer),
            None => ocr,
        })
    }

    fn model_cache(&self) -> OcrResult<ModelCache> {
        let dir = match &self.config.model.cache_dir {
            Some(dir) => dir.clone(),
            None => ModelCache::default_cache_dir().ok_or_else(|| {
                OCRError::config_error("no home directory; set an explicit cache directory")
            })?,
        };
        match &self.fetcher {
            Some(fetcher) => Ok(ModelCache::with_fetcher(dir, fetcher.clone())),
            None => ModelCache::new(dir),
        }
    }
}
