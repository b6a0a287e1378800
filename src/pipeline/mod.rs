//! The recognition pipeline.
//!
//! [`MonOCR`] ties the processors and an inference engine together: it
//! segments a page into lines, recognizes each line, and joins the results.
//! It is built with [`MonOCRBuilder`] or from a [`MonOCRConfig`] loaded by
//! [`ConfigLoader`].

mod builder;
mod config;
mod monocr;
mod result;
mod stats;

pub use builder::MonOCRBuilder;
pub use config::{ConfigFormat, ConfigLoader, ModelConfig, MonOCRConfig, PreprocessConfig};
pub use monocr::MonOCR;
pub use result::{AccuracyReport, BatchResult, LineResult, PageResult};
pub use stats::{PipelineStats, StatsManager};
