//! Domain-level structures shared across the recognition pipeline.
//!
//! The symbol table the model was trained with and the line regions the
//! segmenter hands to recognition.

pub mod charset;
pub mod line;

pub use charset::Charset;
pub use line::{BoundingBox, LineSegment};
