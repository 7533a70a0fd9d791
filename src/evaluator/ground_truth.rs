//! @ai:module:intent Exact and near-exact scoring against a reference answer
//! @ai:module:layer domain
//! @ai:module:public_api GroundTruthScorer, NUMERIC_TOLERANCE
//! @ai:module:stateless true

use crate::corpus::GroundTruth;
use regex::Regex;

/// Absolute tolerance for numeric answers
pub const NUMERIC_TOLERANCE: f64 = 0.01;

/// @ai:intent Scores completions against a known-correct answer
pub struct GroundTruthScorer {
    number_regex: Regex,
    decimal_digit: Regex,
}

impl GroundTruthScorer {
    /// @ai:intent Create a new ground-truth scorer
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            number_regex: Regex::new(r"-?\d+\.?\d*").unwrap(),
            decimal_digit: Regex::new(r"^\d$").unwrap(),
        }
    }

    /// @ai:intent Score a completion as 1.0 (correct) or 0.0
    /// @ai:post result is 0.0 or 1.0
    /// @ai:example (Some("The answer is 42"), Number(42)) -> 1.0
    /// @ai:example (Some("HELLO world"), Text("hello world")) -> 1.0
    /// @ai:example (None, _) -> 0.0
    /// @ai:effects pure
    pub fn score(&self, completion: Option<&str>, ground_truth: &GroundTruth) -> f64 {
        let Some(completion) = completion else {
            return 0.0;
        };

        let response = completion.trim().to_lowercase();

        match ground_truth {
            GroundTruth::Number(expected) => match self.first_number(&response) {
                Some(found) if (found - expected).abs() < NUMERIC_TOLERANCE => 1.0,
                _ => 0.0,
            },
            GroundTruth::Text(expected) => {
                let expected = expected.trim().to_lowercase();
                if response.contains(&expected) || expected.contains(&response) {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// @ai:intent First number-like substring of the text, if it parses
    /// @ai:example "答案是 ４２" -> Some(42.0)
    /// @ai:effects pure
    fn first_number(&self, text: &str) -> Option<f64> {
        let found = self.number_regex.find(text)?;
        let ascii: String = found
            .as_str()
            .chars()
            .map(|c| self.decimal_value(c).map_or(c, |d| char::from(b'0' + d)))
            .collect();

        ascii.trim_end_matches('.').parse::<f64>().ok()
    }

    /// @ai:intent Value of a Unicode decimal digit (general category Nd)
    /// @ai:pre Nd digits are assigned in contiguous runs of ten, starting at zero
    /// @ai:effects pure
    fn decimal_value(&self, c: char) -> Option<u8> {
        if c.is_ascii_digit() {
            return Some(c as u8 - b'0');
        }
        if !self.is_decimal(c) {
            return None;
        }

        // Adjacent runs are each complete, so the offset from the start of the block is the digit.
        let mut start = c as u32;
        while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
            if !self.is_decimal(prev) {
                break;
            }
            start -= 1;
        }

        Some(((c as u32 - start) % 10) as u8)
    }

    fn is_decimal(&self, c: char) -> bool {
        let mut buf = [0u8; 4];
        self.decimal_digit.is_match(c.encode_utf8(&mut buf))
    }
}

impl Default for GroundTruthScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(n: f64) -> GroundTruth {
        GroundTruth::Number(n)
    }

    #[test]
    fn test_numeric_answer_in_sentence() {
        let scorer = GroundTruthScorer::new();
        assert_eq!(scorer.score(Some("The answer is 42"), &number(42.0)), 1.0);
        assert_eq!(scorer.score(Some("The answer is 42."), &number(42.0)), 1.0);
    }

    #[test]
    fn test_numeric_mismatch_and_missing() {
        let scorer = GroundTruthScorer::new();
        assert_eq!(scorer.score(Some("43"), &number(42.0)), 0.0);
        assert_eq!(scorer.score(Some("no numbers here"), &number(42.0)), 0.0);
    }

    #[test]
    fn test_only_first_number_counts() {
        let scorer = GroundTruthScorer::new();
        assert_eq!(scorer.score(Some("Step 1: ... so 42"), &number(42.0)), 0.0);
    }

    #[test]
    fn test_numeric_tolerance_and_sign() {
        let scorer = GroundTruthScorer::new();
        assert_eq!(scorer.score(Some("3.145"), &number(3.14)), 1.0);
        assert_eq!(scorer.score(Some("3.16"), &number(3.14)), 0.0);
        assert_eq!(scorer.score(Some("-7 degrees"), &number(-7.0)), 1.0);
    }

    #[test]
    fn test_non_ascii_digits_are_numbers() {
        let scorer = GroundTruthScorer::new();
        assert_eq!(scorer.score(Some("答案是 ４２"), &number(42.0)), 1.0);
        assert_eq!(scorer.score(Some("الجواب ٤٢"), &number(42.0)), 1.0);
        assert_eq!(scorer.score(Some("result: ３.１４"), &number(3.14)), 1.0);
        assert_eq!(scorer.score(Some("答案是 ４３"), &number(42.0)), 0.0);
    }

    #[test]
    fn test_decimal_value_across_scripts() {
        let scorer = GroundTruthScorer::new();
        assert_eq!(scorer.decimal_value('7'), Some(7));
        assert_eq!(scorer.decimal_value('０'), Some(0));
        assert_eq!(scorer.decimal_value('９'), Some(9));
        assert_eq!(scorer.decimal_value('٣'), Some(3));
        assert_eq!(scorer.decimal_value('५'), Some(5));
        assert_eq!(scorer.decimal_value('𝟗'), Some(9));
        assert_eq!(scorer.decimal_value('x'), None);
        assert_eq!(scorer.decimal_value('½'), None);
    }

    #[test]
    fn test_text_substring_either_direction() {
        let scorer = GroundTruthScorer::new();
        let truth = GroundTruth::Text("hello world".to_string());
        assert_eq!(scorer.score(Some("HELLO world"), &truth), 1.0);
        assert_eq!(scorer.score(Some("  I would say Hello World!  "), &truth), 1.0);
        assert_eq!(scorer.score(Some("hello"), &truth), 1.0);
        assert_eq!(scorer.score(Some("goodbye"), &truth), 0.0);
    }

    #[test]
    fn test_null_completion_scores_zero() {
        let scorer = GroundTruthScorer::new();
        assert_eq!(scorer.score(None, &number(42.0)), 0.0);
        assert_eq!(scorer.score(None, &GroundTruth::Text("x".to_string())), 0.0);
    }
}
