//! Pipeline configuration and its file formats.
//!
//! [`MonOCRConfig`] groups everything needed to build a [`MonOCR`](super::MonOCR):
//! where the model and charset come from, how pages are segmented, and how
//! line crops are turned into tensors. [`ConfigLoader`] reads and writes it
//! as TOML or JSON.

use crate::core::OCRError;
use crate::core::config::{ConfigError, ConfigValidator, OrtSessionConfig};
use crate::core::constants::{
    CHARSET_FILE_NAME, DEFAULT_PARALLEL_THRESHOLD, DEFAULT_REMOTE_BASE,
    DEFAULT_SESSION_POOL_SIZE, DEFAULT_TARGET_HEIGHT, MODEL_FILE_NAME,
};
use crate::models::RemoteArtifact;
use crate::processors::{LineResize, NormalizationRange, ResizePolicy, SegmenterConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the recognition model and charset are found, and how sessions are built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Local model file. When unset the model is resolved through the cache.
    pub model_path: Option<PathBuf>,
    /// Local charset file. When unset the charset is resolved through the cache.
    pub charset_path: Option<PathBuf>,
    /// Cache directory; `None` means `$HOME/.monocr/models`.
    pub cache_dir: Option<PathBuf>,
    /// Download location of the model.
    pub model_url: String,
    /// Download location of the charset.
    pub charset_url: String,
    /// Input tensor name; `None` uses the model's first input.
    pub input_name: Option<String>,
    /// Output tensor name; `None` uses the model's first output.
    pub output_name: Option<String>,
    /// Number of ONNX Runtime sessions shared by concurrent callers.
    pub session_pool_size: usize,
    /// ONNX Runtime session options.
    pub ort_session: Option<OrtSessionConfig>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            charset_path: None,
            cache_dir: None,
            model_url: format!("{DEFAULT_REMOTE_BASE}/{MODEL_FILE_NAME}"),
            charset_url: format!("{DEFAULT_REMOTE_BASE}/{CHARSET_FILE_NAME}"),
            input_name: None,
            output_name: None,
            session_pool_size: DEFAULT_SESSION_POOL_SIZE,
            ort_session: None,
        }
    }
}

impl ModelConfig {
    /// The model as a downloadable artifact.
    pub fn model_artifact(&self) -> RemoteArtifact {
        RemoteArtifact::new(&self.model_url, MODEL_FILE_NAME)
    }

    /// The charset as a downloadable artifact.
    pub fn charset_artifact(&self) -> RemoteArtifact {
        RemoteArtifact::new(&self.charset_url, CHARSET_FILE_NAME)
    }
}

impl ConfigValidator for ModelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive(self.session_pool_size, "session_pool_size")?;
        if let Some(path) = &self.model_path {
            self.validate_file_path(path)?;
        }
        if let Some(path) = &self.charset_path {
            self.validate_file_path(path)?;
        }
        if let Some(ort) = &self.ort_session {
            ort.validate()?;
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// How a line crop becomes the model's input tensor.
///
/// Both settings must match what the model was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Height every line is scaled to.
    pub target_height: u32,
    /// Width handling after scaling.
    pub resize_policy: ResizePolicy,
    /// Pixel value range.
    pub normalization: NormalizationRange,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target_height: DEFAULT_TARGET_HEIGHT,
            resize_policy: ResizePolicy::default(),
            normalization: NormalizationRange::default(),
        }
    }
}

impl PreprocessConfig {
    /// The resize step described by this configuration.
    pub fn line_resize(&self) -> LineResize {
        LineResize::new(self.target_height, self.resize_policy)
    }
}

impl ConfigValidator for PreprocessConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.line_resize().validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Complete configuration of the recognition pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonOCRConfig {
    pub model: ModelConfig,
    pub segmentation: SegmenterConfig,
    pub preprocessing: PreprocessConfig,
    /// Batches with more documents than this run on the rayon pool.
    pub parallel_threshold: usize,
    /// Recognize the whole page as one line when segmentation finds none.
    pub single_line_fallback: bool,
}

impl Default for MonOCRConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            segmentation: SegmenterConfig::default(),
            preprocessing: PreprocessConfig::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            single_line_fallback: false,
        }
    }
}

impl ConfigValidator for MonOCRConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        self.segmentation.validate()?;
        self.preprocessing.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Reads and writes [`MonOCRConfig`] files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file, auto-detecting the format from the extension
    ///
    /// Missing fields take their defaults, so a file only needs the settings
    /// it changes.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use monocr::pipeline::ConfigLoader;
    /// use std::path::Path;
    ///
    /// let config = ConfigLoader::load_from_file(Path::new("monocr.toml"))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_from_file(path: &Path) -> Result<MonOCRConfig, OCRError> {
        let format = Self::format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| OCRError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        Self::load_from_string(&content, format)
    }

    /// Load configuration from a string with specified format
    pub fn load_from_string(content: &str, format: ConfigFormat) -> Result<MonOCRConfig, OCRError> {
        match format {
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| OCRError::ConfigError {
                message: format!("Failed to parse TOML config: {e}"),
            }),
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| OCRError::ConfigError {
                    message: format!("Failed to parse JSON config: {e}"),
                })
            }
        }
    }

    /// Save configuration to a file, auto-detecting the format from the extension
    pub fn save_to_file(config: &MonOCRConfig, path: &Path) -> Result<(), OCRError> {
        let format = Self::format_of(path)?;
        let content = Self::save_to_string(config, format)?;
        std::fs::write(path, content).map_err(|e| OCRError::ConfigError {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to string with specified format
    pub fn save_to_string(config: &MonOCRConfig, format: ConfigFormat) -> Result<String, OCRError> {
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| OCRError::ConfigError {
                    message: format!("Failed to serialize config to TOML: {e}"),
                })
            }
            ConfigFormat::Json => {
                serde_json::to_string_pretty(config).map_err(|e| OCRError::ConfigError {
                    message: format!("Failed to serialize config to JSON: {e}"),
                })
            }
        }
    }

    fn format_of(path: &Path) -> Result<ConfigFormat, OCRError> {
        ConfigFormat::from_extension(path).ok_or_else(|| OCRError::ConfigError {
            message: format!("Unsupported config file extension: {:?}", path.extension()),
        })
    }
}
