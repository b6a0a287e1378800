//! Greedy CTC decoding of recognition model output.
//!
//! The model emits, for each of `T` timesteps, a score for every class. Class
//! `0` is the CTC blank. Decoding takes the best class per timestep, drops
//! blanks, and collapses consecutive repeats; a blank between two equal
//! classes keeps both.

use crate::core::{OCRError, OcrResult, Tensor3D};
use crate::domain::Charset;
use crate::domain::charset::BLANK_INDEX;
use ndarray::ArrayView2;
use std::sync::Arc;

/// Best-path CTC decoder bound to a charset.
///
/// Decoding is deterministic: the same logits always give the same text.
#[derive(Clone)]
pub struct CTCLabelDecode {
    charset: Arc<Charset>,
}

impl std::fmt::Debug for CTCLabelDecode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CTCLabelDecode")
            .field("num_classes", &self.charset.num_classes())
            .finish()
    }
}

impl CTCLabelDecode {
    /// Creates a decoder for `charset`.
    pub fn new(charset: Arc<Charset>) -> Self {
        Self { charset }
    }

    /// The charset used to map classes to symbols.
    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    /// Decodes a `(batch, T, num_classes)` tensor into one string per batch item.
    ///
    /// # Errors
    ///
    /// Returns `OCRError::ShapeMismatch` if the class axis does not equal the
    /// charset's class count; decoding against the wrong charset would produce
    /// plausible-looking garbage.
    pub fn apply(&self, pred: &Tensor3D) -> OcrResult<Vec<String>> {
        let (batch, steps, classes) = pred.dim();
        if classes != self.charset.num_classes() {
            return Err(OCRError::shape_mismatch(
                "recognition output classes",
                &[batch as i64, steps as i64, self.charset.num_classes() as i64],
                &[batch as i64, steps as i64, classes as i64],
            ));
        }

        Ok(pred
            .outer_iter()
            .map(|item| self.decode_indices(&Self::argmax_sequence(item)))
            .collect())
    }

    /// Decodes the output for a single line.
    ///
    /// # Errors
    ///
    /// `OCRError::ShapeMismatch` if the batch size is not one or the class axis is wrong.
    pub fn decode_line(&self, pred: &Tensor3D) -> OcrResult<String> {
        let (batch, steps, classes) = pred.dim();
        if batch != 1 {
            return Err(OCRError::shape_mismatch(
                "recognition output batch",
                &[1, steps as i64, classes as i64],
                &[batch as i64, steps as i64, classes as i64],
            ));
        }
        let mut texts = self.apply(pred)?;
        Ok(texts.pop().unwrap_or_default())
    }

    /// Index of the best class at each timestep.
    ///
    /// Ties resolve to the lowest index.
    pub fn argmax_sequence(scores: ArrayView2<'_, f32>) -> Vec<usize> {
        scores
            .outer_iter()
            .map(|row| {
                let mut best = 0usize;
                let mut best_score = f32::NEG_INFINITY;
                for (idx, &score) in row.iter().enumerate() {
                    if score > best_score {
                        best = idx;
                        best_score = score;
                    }
                }
                best
            })
            .collect()
    }

    /// Collapses a class sequence into text.
    ///
    /// A blank emits nothing but resets repeat suppression. A non-blank class
    /// equal to the previous one is suppressed. Classes outside the charset
    /// are skipped.
    pub fn decode_indices(&self, indices: &[usize]) -> String {
        let mut text = String::with_capacity(indices.len());
        let mut prev: Option<usize> = None;
        for &idx in indices {
            if idx != BLANK_INDEX
                && prev != Some(idx)
                && let Some(symbol) = self.charset.symbol(idx)
            {
                text.push(symbol);
            }
            prev = Some(idx);
        }
        text
    }
}
