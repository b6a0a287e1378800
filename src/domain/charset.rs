//! The ordered symbol table mapping model classes to characters.

use crate::core::errors::{OCRError, OcrResult};
use crate::utils::dict::read_dict_content;
use std::path::Path;

/// Index of the CTC blank class.
pub const BLANK_INDEX: usize = 0;

/// Ordered, immutable list of recognizable symbols.
///
/// Class `0` is the CTC blank and has no symbol; class `i >= 1` maps to the
/// `i - 1`-th symbol. A model trained on this charset therefore emits
/// `len() + 1` classes per timestep.
///
/// The charset resource is a single run of characters with no separators;
/// every Unicode scalar value is one symbol. Surrounding whitespace (a trailing
/// newline in particular) is trimmed, so a space cannot be the first or last
/// symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    symbols: Vec<char>,
}

impl Charset {
    /// Parses a charset from its textual form.
    ///
    /// # Errors
    ///
    /// Returns `OCRError::ConfigError` if nothing is left after trimming.
    pub fn parse(text: &str) -> OcrResult<Self> {
        let symbols: Vec<char> = text.trim().chars().collect();
        if symbols.is_empty() {
            return Err(OCRError::config_error("charset is empty"));
        }
        Ok(Self { symbols })
    }

    /// Reads and parses a UTF-8 charset file.
    pub fn from_file(path: &Path) -> OcrResult<Self> {
        let content = read_dict_content(path)?;
        Self::parse(&content).map_err(|_| {
            OCRError::config_error(format!("charset file '{}' is empty", path.display()))
        })
    }

    /// Number of symbols, excluding the blank.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always `false`; construction rejects empty charsets.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of classes the model must emit: symbols plus the blank.
    pub fn num_classes(&self) -> usize {
        self.symbols.len() + 1
    }

    /// Symbol for a model class, `None` for the blank or an out-of-range class.
    pub fn symbol(&self, class_index: usize) -> Option<char> {
        if class_index == BLANK_INDEX {
            return None;
        }
        self.symbols.get(class_index - 1).copied()
    }

    /// The symbols in class order.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }
}

impl std::str::FromStr for Charset {
    type Err = OCRError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_class_mapping_skips_blank() {
        let charset = Charset::parse("ab").unwrap();
        assert_eq!(charset.num_classes(), 3);
        assert_eq!(charset.symbol(0), None);
        assert_eq!(charset.symbol(1), Some('a'));
        assert_eq!(charset.symbol(2), Some('b'));
        assert_eq!(charset.symbol(3), None);
    }

    #[test]
    fn test_symbols_are_code_points() {
        let charset = Charset::parse("ကခ ဂ").unwrap();
        assert_eq!(charset.len(), 4);
        assert_eq!(charset.symbol(3), Some(' '));
        assert_eq!(charset.symbol(4), Some('ဂ'));
    }

    #[test]
    fn test_trailing_newline_is_trimmed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "xyz").unwrap();
        let charset = Charset::from_file(file.path()).unwrap();
        assert_eq!(charset.symbols(), &['x', 'y', 'z']);
    }

    #[test]
    fn test_empty_charset_rejected() {
        assert!(Charset::parse("  \n").is_err());
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            Charset::from_file(file.path()),
            Err(OCRError::ConfigError { .. })
        ));
    }
}
