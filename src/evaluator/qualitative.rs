//! @ai:module:intent Rubric-based heuristic scoring for open-ended tasks
//! @ai:module:layer domain
//! @ai:module:public_api QualitativeScorer, NO_CRITERIA_SCORE
//! @ai:module:stateless true

/// Score given when a task defines no rubric at all
pub const NO_CRITERIA_SCORE: f64 = 0.5;

/// Terms must be longer than this many characters to count
const MIN_TERM_CHARS: usize = 2;

/// @ai:intent Scores a completion by the fraction of rubric phrases it covers
pub struct QualitativeScorer;

impl QualitativeScorer {
    /// @ai:intent Create a new qualitative scorer
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Fraction of rubric phrases matched by the completion
    /// @ai:post result in [0.0, 1.0]
    /// @ai:example (None, _) -> 0.0
    /// @ai:example (Some(_), []) -> 0.5
    /// @ai:effects pure
    pub fn score(&self, completion: Option<&str>, criteria: &[String]) -> f64 {
        let Some(completion) = completion else {
            return 0.0;
        };

        if criteria.is_empty() {
            return NO_CRITERIA_SCORE;
        }

        let response = completion.to_lowercase();
        let matched = criteria
            .iter()
            .filter(|criterion| phrase_matches(&response, criterion))
            .count();

        matched as f64 / criteria.len() as f64
    }
}

impl Default for QualitativeScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Lowercased terms of a rubric phrase longer than two characters
/// @ai:effects pure
fn key_terms(criterion: &str) -> Vec<String> {
    criterion
        .to_lowercase()
        .replace(',', " ")
        .split_whitespace()
        .filter(|term| term.chars().count() > MIN_TERM_CHARS)
        .map(str::to_string)
        .collect()
}

/// @ai:intent A phrase matches when at least half of its terms occur in the response
/// @ai:pre response is lowercased
/// @ai:effects pure
fn phrase_matches(response: &str, criterion: &str) -> bool {
    let terms = key_terms(criterion);
    let hits = terms.iter().filter(|term| response.contains(term.as_str())).count();

    hits as f64 >= terms.len() as f64 * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_of_three_criteria() {
        let scorer = QualitativeScorer::new();
        let rubric = criteria(&[
            "time complexity analysis",
            "uses hash set",
            "handles concurrency safely",
        ]);
        let completion = "The time complexity is O(n) because we use a hash set.";

        let score = scorer.score(Some(completion), &rubric);
        assert!((score - 2.0 / 3.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_criteria_is_default() {
        let scorer = QualitativeScorer::new();
        assert_eq!(scorer.score(Some("anything"), &[]), 0.5);
    }

    #[test]
    fn test_null_completion_scores_zero() {
        let scorer = QualitativeScorer::new();
        assert_eq!(scorer.score(None, &criteria(&["clear structure"])), 0.0);
        assert_eq!(scorer.score(None, &[]), 0.0);
    }

    #[test]
    fn test_key_terms_drop_short_words_and_commas() {
        assert_eq!(
            key_terms("Uses a cache, or DB"),
            vec!["uses".to_string(), "cache".to_string()]
        );
    }

    #[test]
    fn test_half_threshold_is_inclusive() {
        let scorer = QualitativeScorer::new();
        let rubric = criteria(&["memory layout diagram"]);
        assert_eq!(scorer.score(Some("no match at all"), &rubric), 0.0);

        let rubric = criteria(&["memory layout"]);
        assert_eq!(scorer.score(Some("memory only"), &rubric), 1.0);
    }

    #[test]
    fn test_phrase_without_long_terms_always_matches() {
        let scorer = QualitativeScorer::new();
        assert_eq!(scorer.score(Some("unrelated"), &criteria(&["is ok"])), 1.0);
    }
}
