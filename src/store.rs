//! @ai:module:intent Per-run result records and their append-only file store
//! @ai:module:layer infrastructure
//! @ai:module:public_api RunResult, ResultStore
//! @ai:module:stateless false

use crate::runner::client::Meta;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent One record per (model, task) execution attempt
///            Either a completion or an error is present, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub model_id: String,
    pub task_id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub latency: f64,
    #[serde(default)]
    pub completion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualitative_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

impl RunResult {
    /// @ai:intent Record for a call that produced a completion
    /// @ai:post accuracy clamped to [0, 1]; output_tokens is None for an empty completion
    /// @ai:effects time
    #[allow(clippy::too_many_arguments)]
    pub fn completed(
        model_id: &str,
        task_id: &str,
        category: &str,
        completion: String,
        latency: f64,
        accuracy: f64,
        qualitative_score: Option<f64>,
        meta: Meta,
    ) -> Self {
        let output_tokens = (!completion.is_empty()).then(|| estimate_tokens(&completion));

        Self {
            model_id: model_id.to_string(),
            task_id: task_id.to_string(),
            category: category.to_string(),
            timestamp: now_timestamp(),
            accuracy: clamp_unit(accuracy),
            latency: latency.max(0.0),
            completion: Some(completion),
            error: None,
            qualitative_score: qualitative_score.map(clamp_unit),
            meta: Some(meta),
            output_tokens,
        }
    }

    /// @ai:intent Record for a failed call
    /// @ai:post accuracy is 0.0 and completion is null
    /// @ai:effects time
    pub fn errored(model_id: &str, task_id: &str, category: &str, error: String, latency: f64) -> Self {
        Self {
            model_id: model_id.to_string(),
            task_id: task_id.to_string(),
            category: category.to_string(),
            timestamp: now_timestamp(),
            accuracy: 0.0,
            latency: latency.max(0.0),
            completion: None,
            error: Some(error),
            qualitative_score: None,
            meta: None,
            output_tokens: None,
        }
    }

    /// @ai:intent Whether this record carries an error
    /// @ai:effects pure
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// @ai:intent Rough output token count, four characters per token
/// @ai:effects pure
pub fn estimate_tokens(completion: &str) -> u64 {
    (completion.chars().count() / 4) as u64
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// @ai:intent Directory of JSON files, one per RunResult, never overwritten
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    /// @ai:intent Create a store rooted at a directory (created on first write)
    /// @ai:effects pure
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// @ai:intent Persist a record under a fresh, unique file name
    /// @ai:post no existing file is modified
    /// @ai:effects fs:write
    pub fn persist(&self, result: &RunResult) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create results directory {}", self.dir.display()))?;

        let json = serde_json::to_string_pretty(result)?;
        let stem = format!(
            "{}_{}_{}",
            sanitize(&result.model_id),
            sanitize(&result.task_id),
            chrono::Utc::now().timestamp_millis()
        );

        for attempt in 0u32.. {
            let name = if attempt == 0 {
                format!("{}.json", stem)
            } else {
                format!("{}_{}.json", stem, attempt)
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(json.as_bytes())
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::debug!("Saved result to {}", path.display());
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {}", path.display()));
                }
            }
        }

        unreachable!("exhausted unique file names")
    }

    /// @ai:intent Load every record currently in the store
    /// @ai:post files are read in name order; unreadable files are skipped with a warning
    /// @ai:effects fs:read
    pub fn load_all(&self) -> Result<Vec<RunResult>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&self.dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "json")
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();
        paths.sort();

        let mut results = Vec::with_capacity(paths.len());

        for path in paths {
            match read_result(&path) {
                Ok(result) => results.push(result),
                Err(e) => tracing::warn!("Skipping unreadable result {}: {:#}", path.display(), e),
            }
        }

        Ok(results)
    }
}

fn read_result(path: &Path) -> Result<RunResult> {
    let content = std::fs::read_to_string(path)?;
    let result = serde_json::from_str(&content)?;
    Ok(result)
}

/// @ai:intent Make an identifier safe to embed in a file name
/// @ai:effects pure
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> RunResult {
        RunResult::completed(
            "kimi_k2_direct",
            "math_01",
            "math",
            "The answer is 42".to_string(),
            2.0,
            1.0,
            None,
            Meta::new(),
        )
    }

    #[test]
    fn test_completed_estimates_tokens() {
        let result = sample();
        assert_eq!(result.output_tokens, Some(4));
        assert!(!result.is_error());
    }

    #[test]
    fn test_empty_completion_has_no_token_count() {
        let result = RunResult::completed("m", "t", "c", String::new(), 1.0, 0.0, None, Meta::new());

        assert_eq!(result.completion.as_deref(), Some(""));
        assert_eq!(result.output_tokens, None);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("output_tokens").is_none());
    }

    #[test]
    fn test_errored_has_null_completion() {
        let result = RunResult::errored("m", "t", "math", "boom".to_string(), 0.0);
        assert_eq!(result.accuracy, 0.0);
        assert!(result.completion.is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["completion"].is_null());
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn test_accuracy_is_clamped() {
        let result = RunResult::completed(
            "m",
            "t",
            "c",
            "x".to_string(),
            1.0,
            1.7,
            Some(-0.2),
            Meta::new(),
        );
        assert_eq!(result.accuracy, 1.0);
        assert_eq!(result.qualitative_score, Some(0.0));
    }

    #[test]
    fn test_persist_and_reload() {
        let temp = TempDir::new().unwrap();
        let store = ResultStore::new(temp.path().join("raw"));

        let result = sample();
        let path = store.persist(&result).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("kimi_k2_direct_math_01_"));

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, vec![result]);
    }

    #[test]
    fn test_persist_never_overwrites() {
        let temp = TempDir::new().unwrap();
        let store = ResultStore::new(temp.path());

        let result = sample();
        let paths: Vec<_> = (0..5).map(|_| store.persist(&result).unwrap()).collect();

        let unique: std::collections::HashSet<_> = paths.iter().collect();
        assert_eq!(unique.len(), 5);
        assert_eq!(store.load_all().unwrap().len(), 5);
    }

    #[test]
    fn test_load_skips_invalid_files() {
        let temp = TempDir::new().unwrap();
        let store = ResultStore::new(temp.path());
        store.persist(&sample()).unwrap();
        std::fs::write(temp.path().join("garbage.json"), "{not json").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing_directory_is_empty() {
        let store = ResultStore::new("/definitely/not/here");
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_loads_sparse_records() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("qwen.json"),
            r#"{"model_id": "qwen3_coder_30b", "task_id": "t", "error": "Model not available"}"#,
        )
        .unwrap();

        let loaded = ResultStore::new(temp.path()).load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].is_error());
        assert_eq!(loaded[0].accuracy, 0.0);
    }
}
