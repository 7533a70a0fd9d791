//! @ai:module:intent TOML corpus loader for benchmark tasks
//! @ai:module:layer infrastructure
//! @ai:module:public_api CorpusLoader
//! @ai:module:stateless true

use crate::config::FilterConfig;
use crate::corpus::task::{BenchmarkTask, TaskFile};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

/// @ai:intent Trait for loading the task corpus
pub trait CorpusLoaderTrait: Send + Sync {
    /// @ai:intent Load all tasks from a corpus directory
    fn load_all(&self, tasks_dir: &Path) -> Result<Vec<BenchmarkTask>>;

    /// @ai:intent Load tasks matching filter criteria
    fn load_filtered(&self, tasks_dir: &Path, filter: &FilterConfig) -> Result<Vec<BenchmarkTask>>;
}

/// @ai:intent Loads task definitions from TOML files
pub struct CorpusLoader;

impl CorpusLoader {
    /// @ai:intent Create a new corpus loader
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Parse a single task file
    /// @ai:pre path points to a valid TOML file
    /// @ai:effects fs:read
    fn parse_task_file(path: &Path) -> Result<BenchmarkTask> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read task file: {}", path.display()))?;

        let task_file: TaskFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse task file: {}", path.display()))?;

        let task: BenchmarkTask = task_file.into();
        task.validate()?;
        Ok(task)
    }

    /// @ai:intent Find all TOML files in directory
    /// @ai:effects fs:read
    fn find_task_files(tasks_dir: &Path) -> Vec<std::path::PathBuf> {
        WalkDir::new(tasks_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "toml")
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect()
    }

    /// @ai:intent Merge inline tasks with tasks found on disk, keeping the first of each id
    /// @ai:post result has unique ids, inline tasks first
    /// @ai:effects fs:read
    pub fn load_with_inline(
        &self,
        inline: &[BenchmarkTask],
        tasks_dir: &Path,
        filter: &FilterConfig,
    ) -> Result<Vec<BenchmarkTask>> {
        let mut seen = HashSet::new();
        for task in inline {
            task.validate()?;
            if !seen.insert(task.id.clone()) {
                anyhow::bail!("duplicate task id in configuration: {}", task.id);
            }
        }

        let mut tasks: Vec<BenchmarkTask> = inline
            .iter()
            .filter(|task| filter.matches(&task.category, &task.id))
            .cloned()
            .collect();

        if tasks_dir.exists() {
            for task in self.load_filtered(tasks_dir, filter)? {
                if seen.insert(task.id.clone()) {
                    tasks.push(task);
                } else {
                    tracing::warn!("Ignoring duplicate task id {} from {}", task.id, tasks_dir.display());
                }
            }
        }

        Ok(tasks)
    }
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusLoaderTrait for CorpusLoader {
    /// @ai:intent Load all tasks from corpus directory
    /// @ai:effects fs:read
    fn load_all(&self, tasks_dir: &Path) -> Result<Vec<BenchmarkTask>> {
        let files = Self::find_task_files(tasks_dir);
        let mut tasks = Vec::with_capacity(files.len());

        for path in files {
            match Self::parse_task_file(&path) {
                Ok(task) => tasks.push(task),
                Err(e) => {
                    tracing::warn!("Skipping invalid task file {}: {:#}", path.display(), e);
                }
            }
        }

        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tasks)
    }

    /// @ai:intent Load tasks matching filter criteria
    /// @ai:effects fs:read
    fn load_filtered(&self, tasks_dir: &Path, filter: &FilterConfig) -> Result<Vec<BenchmarkTask>> {
        let all_tasks = self.load_all(tasks_dir)?;

        Ok(all_tasks
            .into_iter()
            .filter(|task| filter.matches(&task.category, &task.id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_task(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut file = std::fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    const MATH_TASK: &str = r#"
[task]
id = "math_olympiad_01"
category = "math"
prompt = "How many primes are below 20?"
has_ground_truth = true
ground_truth = 8
"#;

    const CREATIVE_TASK: &str = r#"
[task]
id = "creative_agentic_01"
category = "creative"
prompt = "Plan a research agent."
evaluation_criteria = ["clear plan structure", "tool usage"]
"#;

    #[test]
    fn test_load_single_task() {
        let temp = TempDir::new().unwrap();
        create_test_task(temp.path(), "math.toml", MATH_TASK);

        let loader = CorpusLoader::new();
        let tasks = loader.load_all(temp.path()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "math_olympiad_01");
        assert!(tasks[0].has_ground_truth);
    }

    #[test]
    fn test_load_filtered_by_category() {
        let temp = TempDir::new().unwrap();
        create_test_task(temp.path(), "math.toml", MATH_TASK);
        create_test_task(temp.path(), "nested/creative.toml", CREATIVE_TASK);

        let loader = CorpusLoader::new();
        let filter = FilterConfig {
            categories: Some(vec!["creative".to_string()]),
            ..Default::default()
        };

        let tasks = loader.load_filtered(temp.path(), &filter).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "creative_agentic_01");
        assert_eq!(tasks[0].evaluation_criteria.len(), 2);
    }

    #[test]
    fn test_invalid_task_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        create_test_task(temp.path(), "math.toml", MATH_TASK);
        create_test_task(temp.path(), "broken.toml", "[task]\nid = \"x\"\nhas_ground_truth = true\n");

        let tasks = CorpusLoader::new().load_all(temp.path()).unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_inline_tasks_take_precedence() {
        let temp = TempDir::new().unwrap();
        create_test_task(temp.path(), "math.toml", MATH_TASK);

        let inline = vec![BenchmarkTask {
            id: "math_olympiad_01".to_string(),
            category: "math".to_string(),
            prompt: "inline prompt".to_string(),
            has_ground_truth: true,
            ground_truth: Some(crate::corpus::GroundTruth::Number(8.0)),
            evaluation_criteria: vec![],
        }];

        let tasks = CorpusLoader::new()
            .load_with_inline(&inline, temp.path(), &FilterConfig::default())
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].prompt, "inline prompt");
    }

    #[test]
    fn test_inline_and_disk_tasks_share_filter() {
        let temp = TempDir::new().unwrap();
        create_test_task(temp.path(), "math.toml", MATH_TASK);
        create_test_task(temp.path(), "creative.toml", CREATIVE_TASK);

        let inline = vec![BenchmarkTask {
            id: "inline_math".to_string(),
            category: "math".to_string(),
            prompt: "What is 2 + 2?".to_string(),
            has_ground_truth: true,
            ground_truth: Some(crate::corpus::GroundTruth::Number(4.0)),
            evaluation_criteria: vec![],
        }];
        let filter = FilterConfig {
            categories: Some(vec!["math".to_string()]),
            ..Default::default()
        };

        let tasks = CorpusLoader::new()
            .load_with_inline(&inline, temp.path(), &filter)
            .unwrap();
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["inline_math", "math_olympiad_01"]);
    }

    #[test]
    fn test_filtered_out_inline_task_still_shadows_disk_task() {
        let temp = TempDir::new().unwrap();
        create_test_task(temp.path(), "math.toml", MATH_TASK);

        let inline = vec![BenchmarkTask {
            id: "math_olympiad_01".to_string(),
            category: "puzzles".to_string(),
            prompt: "inline prompt".to_string(),
            has_ground_truth: true,
            ground_truth: Some(crate::corpus::GroundTruth::Number(8.0)),
            evaluation_criteria: vec![],
        }];
        let filter = FilterConfig {
            categories: Some(vec!["math".to_string()]),
            ..Default::default()
        };

        let tasks = CorpusLoader::new()
            .load_with_inline(&inline, temp.path(), &filter)
            .unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_duplicate_inline_ids_are_rejected() {
        let task = BenchmarkTask {
            id: "dup".to_string(),
            category: "coding".to_string(),
            prompt: "p".to_string(),
            has_ground_truth: false,
            ground_truth: None,
            evaluation_criteria: vec![],
        };
        let result = CorpusLoader::new().load_with_inline(
            &[task.clone(), task],
            Path::new("does-not-exist"),
            &FilterConfig::default(),
        );
        assert!(result.is_err());
    }
}
