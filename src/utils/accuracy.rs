//! Character-level similarity between recognized text and a reference.

/// Similarity of `predicted` to `ground_truth` as a percentage in `[0, 100]`.
///
/// Computed as `(1 - d / max(len_p, len_g)) * 100`, where `d` is the
/// Levenshtein distance and lengths count Unicode code points. Two empty
/// strings score 100; any non-empty prediction against an empty reference
/// scores 0. The value is not rounded.
///
/// # Example
///
/// ```rust
/// use monocr::utils::calculate_accuracy;
///
/// assert_eq!(calculate_accuracy("abc", "abc"), 100.0);
/// assert!((calculate_accuracy("abc", "abd") - 200.0 / 3.0).abs() < 1e-9);
/// ```
pub fn calculate_accuracy(predicted: &str, ground_truth: &str) -> f64 {
    let predicted_len = predicted.chars().count();
    let truth_len = ground_truth.chars().count();
    let max_len = predicted_len.max(truth_len);
    if max_len == 0 {
        return 100.0;
    }
    if truth_len == 0 {
        return 0.0;
    }
    let distance = strsim::levenshtein(predicted, ground_truth);
    (1.0 - distance as f64 / max_len as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(calculate_accuracy("abc", "abc"), 100.0);
    }

    #[test]
    fn test_one_substitution_over_three() {
        let score = calculate_accuracy("abc", "abd");
        assert!((score - (1.0 - 1.0 / 3.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_cases() {
        assert_eq!(calculate_accuracy("", ""), 100.0);
        assert_eq!(calculate_accuracy("x", ""), 0.0);
        assert_eq!(calculate_accuracy("", "xy"), 0.0);
    }

    #[test]
    fn test_counts_code_points_not_bytes() {
        // Each Myanmar letter is three bytes in UTF-8.
        let score = calculate_accuracy("ကခ", "ကဂ");
        assert!((score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_length_difference() {
        let score = calculate_accuracy("ab", "abcd");
        assert!((score - 50.0).abs() < 1e-9);
    }
}
