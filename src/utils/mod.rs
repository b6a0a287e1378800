//! Utility functions for the recognition pipeline.
//!
//! Image loading, charset file reading, the accuracy scorer, the PDF
//! rasterizer bridge and logging setup.

pub mod accuracy;
pub mod dict;
pub mod image;
pub mod pdf;

pub use accuracy::calculate_accuracy;
pub use dict::read_dict_content;
pub use image::{decode_gray_image, dynamic_to_gray, load_gray_image, load_image};
pub use pdf::{PdfRasterizer, RasterizedPdf};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
