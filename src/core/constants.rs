//! Constants used throughout the recognition pipeline.
//!
//! Numeric defaults for segmentation and preprocessing, the tensor names the
//! published model uses, and the remote location of its artifacts.

/// Luminance below which a pixel counts as ink (8-bit scale).
pub const DEFAULT_INK_THRESHOLD: u8 = 128;

/// Window of the centered moving average applied to the row profile.
pub const DEFAULT_SMOOTH_WINDOW: usize = 3;

/// Minimum height in rows for a band to be accepted as a text line.
pub const DEFAULT_MIN_LINE_HEIGHT: u32 = 10;

/// Padding in pixels added around each detected line before cropping.
pub const DEFAULT_LINE_PADDING: u32 = 4;

/// Fraction of the mean positive row density under which a row is a gap.
pub const DEFAULT_GAP_RATIO: f32 = 0.05;

/// Input height of the recognition model.
pub const DEFAULT_TARGET_HEIGHT: u32 = 64;

/// Fixed input width of the recognition model when padding is enabled.
pub const DEFAULT_TARGET_WIDTH: u32 = 1024;

/// The default threshold for parallel processing.
///
/// Batches with more documents than this run on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Number of ONNX Runtime sessions kept in the inference pool.
pub const DEFAULT_SESSION_POOL_SIZE: usize = 1;

/// Name of the model's input tensor.
pub const DEFAULT_INPUT_NAME: &str = "input";

/// Name of the model's output tensor.
pub const DEFAULT_OUTPUT_NAME: &str = "output";

/// Base URL the model artifacts are published under.
pub const DEFAULT_REMOTE_BASE: &str = "https://huggingface.co/janakh/monocr/resolve/main";

/// File name of the recognition model in the cache.
pub const MODEL_FILE_NAME: &str = "monocr.onnx";

/// File name of the charset in the cache.
pub const CHARSET_FILE_NAME: &str = "charset.txt";

/// Cache directory relative to the user's home directory.
pub const DEFAULT_CACHE_SUBDIR: &str = ".monocr/models";

/// Resolution used when rasterizing PDF pages.
pub const DEFAULT_PDF_DPI: u32 = 300;
