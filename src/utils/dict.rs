//! Charset resource loading helpers.

use crate::core::OCRError;
use std::path::Path;

/// Reads a charset file and returns its raw content.
///
/// # Errors
///
/// Returns an `OCRError::InvalidInput` if the file cannot be read or is not UTF-8.
///
/// # Example
///
/// ```rust,no_run
/// use monocr::utils::read_dict_content;
/// use std::path::Path;
///
/// let content = read_dict_content(Path::new("models/charset.txt"))?;
/// # Ok::<(), monocr::core::OCRError>(())
/// ```
pub fn read_dict_content(path: &Path) -> Result<String, OCRError> {
    std::fs::read_to_string(path).map_err(|e| OCRError::InvalidInput {
        message: format!("Failed to read charset from '{}': {}", path.display(), e),
    })
}
