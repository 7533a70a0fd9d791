//! @ai:module:intent Task definitions for the benchmark corpus
//! @ai:module:layer domain
//! @ai:module:public_api BenchmarkTask, GroundTruth, TaskFile
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};

/// @ai:intent Known-correct reference answer for a task
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroundTruth {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for GroundTruth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroundTruth::Number(n) => write!(f, "{}", n),
            GroundTruth::Text(s) => write!(f, "{}", s),
        }
    }
}

/// @ai:intent A benchmark task definition
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkTask {
    pub id: String,
    /// Free-form tag such as "reasoning", "coding", "math" or "creative"
    #[serde(default = "default_category")]
    pub category: String,
    pub prompt: String,
    #[serde(default)]
    pub has_ground_truth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<GroundTruth>,
    /// Rubric phrases, only consulted when there is no ground truth
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evaluation_criteria: Vec<String>,
}

fn default_category() -> String {
    "unknown".to_string()
}

impl BenchmarkTask {
    /// @ai:intent Check the ground-truth fields agree with each other
    /// @ai:effects pure
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.id.trim().is_empty() {
            anyhow::bail!("task has an empty id");
        }

        if self.has_ground_truth && self.ground_truth.is_none() {
            anyhow::bail!(
                "task {} declares has_ground_truth but has no ground_truth value",
                self.id
            );
        }

        if !self.has_ground_truth && self.ground_truth.is_some() {
            tracing::warn!(
                "Task {} has a ground_truth but has_ground_truth is false; it will be scored qualitatively",
                self.id
            );
        }

        Ok(())
    }
}

/// @ai:intent Raw task structure from a per-task TOML file
/// @ai:effects pure
#[derive(Debug, Deserialize)]
pub struct TaskFile {
    pub task: BenchmarkTask,
}

impl From<TaskFile> for BenchmarkTask {
    fn from(file: TaskFile) -> Self {
        file.task
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_truth_parses_number_and_text() {
        let numeric: TaskFile = toml::from_str(
            r#"
[task]
id = "math_01"
category = "math"
prompt = "What is 6 * 7?"
has_ground_truth = true
ground_truth = 42
"#,
        )
        .unwrap();
        assert_eq!(numeric.task.ground_truth, Some(GroundTruth::Number(42.0)));

        let text: TaskFile = toml::from_str(
            r#"
[task]
id = "capital_01"
prompt = "Capital of France?"
has_ground_truth = true
ground_truth = "Paris"
"#,
        )
        .unwrap();
        assert_eq!(
            text.task.ground_truth,
            Some(GroundTruth::Text("Paris".to_string()))
        );
        assert_eq!(text.task.category, "unknown");
    }

    #[test]
    fn test_validate_rejects_missing_ground_truth() {
        let task = BenchmarkTask {
            id: "broken".to_string(),
            category: "math".to_string(),
            prompt: "?".to_string(),
            has_ground_truth: true,
            ground_truth: None,
            evaluation_criteria: vec![],
        };
        assert!(task.validate().is_err());
    }
}
