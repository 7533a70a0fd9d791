//! @ai:module:intent Scoring of model completions against task definitions
//! @ai:module:layer application
//! @ai:module:public_api Evaluator, Score, ScorerTrait, GroundTruthScorer, QualitativeScorer

pub mod ground_truth;
pub mod qualitative;

pub use ground_truth::{GroundTruthScorer, NUMERIC_TOLERANCE};
pub use qualitative::{QualitativeScorer, NO_CRITERIA_SCORE};

use crate::corpus::BenchmarkTask;

/// @ai:intent Score produced for one completion, tagged with the mode that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    GroundTruth(f64),
    Qualitative(f64),
}

impl Score {
    /// @ai:intent Numeric value in [0.0, 1.0]
    /// @ai:effects pure
    pub fn value(&self) -> f64 {
        match self {
            Score::GroundTruth(v) | Score::Qualitative(v) => v.clamp(0.0, 1.0),
        }
    }

    /// @ai:intent Value to record as qualitative_score, if this was a rubric score
    /// @ai:effects pure
    pub fn qualitative(&self) -> Option<f64> {
        match self {
            Score::Qualitative(_) => Some(self.value()),
            Score::GroundTruth(_) => None,
        }
    }
}

/// @ai:intent Trait for scoring a completion
pub trait ScorerTrait: Send + Sync {
    /// @ai:intent Score a completion for a task; total, never fails
    fn score(&self, task: &BenchmarkTask, completion: Option<&str>) -> Score;
}

/// @ai:intent Picks ground-truth or qualitative scoring per task
pub struct Evaluator {
    ground_truth: GroundTruthScorer,
    qualitative: QualitativeScorer,
}

impl Evaluator {
    /// @ai:intent Create a new evaluator with both scorers
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            ground_truth: GroundTruthScorer::new(),
            qualitative: QualitativeScorer::new(),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScorerTrait for Evaluator {
    /// @ai:intent Dispatch on has_ground_truth
    /// @ai:effects pure
    fn score(&self, task: &BenchmarkTask, completion: Option<&str>) -> Score {
        if task.has_ground_truth {
            let value = task
                .ground_truth
                .as_ref()
                .map(|truth| self.ground_truth.score(completion, truth))
                .unwrap_or(0.0);
            Score::GroundTruth(value)
        } else {
            Score::Qualitative(self.qualitative.score(completion, &task.evaluation_criteria))
        }
    }
}
