//! @ai:module:intent Matrix execution of every model against every task
//! @ai:module:layer application
//! @ai:module:public_api BenchmarkRunner
//! @ai:module:stateless false

use crate::corpus::BenchmarkTask;
use crate::evaluator::{Evaluator, ScorerTrait};
use crate::runner::client::{ModelClient, Outcome};
use crate::runner::registry::ClientRegistry;
use crate::store::{ResultStore, RunResult};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// @ai:intent Runs tasks against registered clients, scoring and persisting each cell
pub struct BenchmarkRunner {
    registry: ClientRegistry,
    scorer: Arc<dyn ScorerTrait>,
    store: ResultStore,
}

impl BenchmarkRunner {
    /// @ai:intent Create a runner with the default evaluator
    /// @ai:effects pure
    pub fn new(registry: ClientRegistry, store: ResultStore) -> Self {
        Self::with_scorer(registry, Arc::new(Evaluator::new()), store)
    }

    /// @ai:intent Create a runner with a custom scorer
    /// @ai:effects pure
    pub fn with_scorer(
        registry: ClientRegistry,
        scorer: Arc<dyn ScorerTrait>,
        store: ResultStore,
    ) -> Self {
        Self {
            registry,
            scorer,
            store,
        }
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// @ai:intent Execute the full model x task matrix sequentially
    /// @ai:post exactly one result per (model, task), models in registry order
    /// @ai:effects network, fs:write
    pub async fn run_all(&self, tasks: &[BenchmarkTask]) -> Vec<RunResult> {
        let model_ids = self.registry.model_ids();
        let total = model_ids.len() * tasks.len();
        let mut results = Vec::with_capacity(total);

        tracing::info!(
            "Running {} models x {} tasks ({} cells)",
            model_ids.len(),
            tasks.len(),
            total
        );

        for model_id in &model_ids {
            for task in tasks {
                let result = self.run_cell(model_id, task).await;

                match &result.error {
                    Some(error) => tracing::warn!(
                        "[{}/{}] {} x {}: error: {}",
                        results.len() + 1,
                        total,
                        model_id,
                        task.id,
                        error
                    ),
                    None => tracing::info!(
                        "[{}/{}] {} x {}: accuracy {:.2}, {:.2}s",
                        results.len() + 1,
                        total,
                        model_id,
                        task.id,
                        result.accuracy,
                        result.latency
                    ),
                }

                results.push(result);
            }
        }

        let failed = results.iter().filter(|r| r.is_error()).count();
        tracing::info!("Completed {} runs ({} failed)", results.len(), failed);

        results
    }

    /// @ai:intent Execute one (model, task) cell and persist the result
    /// @ai:post never panics; failures become errored results
    /// @ai:effects network, fs:write
    pub async fn run_cell(&self, model_id: &str, task: &BenchmarkTask) -> RunResult {
        let result = match self.registry.get(model_id) {
            Some(client) => {
                let attempt = AssertUnwindSafe(self.invoke_and_score(client.as_ref(), model_id, task))
                    .catch_unwind()
                    .await;

                attempt.unwrap_or_else(|panic| {
                    RunResult::errored(
                        model_id,
                        &task.id,
                        &task.category,
                        format!("panicked: {}", panic_message(panic.as_ref())),
                        0.0,
                    )
                })
            }
            None => RunResult::errored(
                model_id,
                &task.id,
                &task.category,
                format!("Unknown model: {}", model_id),
                0.0,
            ),
        };

        if let Err(e) = self.store.persist(&result) {
            tracing::warn!(
                "Failed to persist result for {} x {}: {:#}",
                model_id,
                task.id,
                e
            );
        }

        result
    }

    /// @ai:intent Invoke a client and score its completion
    /// @ai:effects network
    async fn invoke_and_score(
        &self,
        client: &dyn ModelClient,
        model_id: &str,
        task: &BenchmarkTask,
    ) -> RunResult {
        match client.invoke(&task.prompt).await {
            Outcome::Success {
                completion,
                latency,
                meta,
            } => {
                let score = self.scorer.score(task, Some(&completion));
                RunResult::completed(
                    model_id,
                    &task.id,
                    &task.category,
                    completion,
                    latency,
                    score.value(),
                    score.qualitative(),
                    meta,
                )
            }
            Outcome::Failure { error, latency } => {
                RunResult::errored(model_id, &task.id, &task.category, error, latency)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::GroundTruth;
    use crate::evaluator::Score;
    use crate::runner::client::MockClient;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    /// Panics whenever the prompt mentions "boom"
    struct FragileClient;

    #[async_trait]
    impl ModelClient for FragileClient {
        async fn invoke(&self, prompt: &str) -> Outcome {
            if prompt.contains("boom") {
                panic!("backend exploded");
            }
            Outcome::Success {
                completion: "42".to_string(),
                latency: 1.0,
                meta: Default::default(),
            }
        }
    }

    struct PanickingScorer;

    impl ScorerTrait for PanickingScorer {
        fn score(&self, _task: &BenchmarkTask, _completion: Option<&str>) -> Score {
            panic!("scorer bug")
        }
    }

    fn task(id: &str, prompt: &str) -> BenchmarkTask {
        BenchmarkTask {
            id: id.to_string(),
            category: "math".to_string(),
            prompt: prompt.to_string(),
            has_ground_truth: true,
            ground_truth: Some(GroundTruth::Number(42.0)),
            evaluation_criteria: vec![],
        }
    }

    fn registry() -> ClientRegistry {
        let mut registry = ClientRegistry::new();
        registry.register("steady", Arc::new(MockClient::new("The answer is 42").with_latency(2.0)));
        registry.register("fragile", Arc::new(FragileClient));
        registry
    }

    #[tokio::test]
    async fn test_panicking_cell_is_isolated() {
        let temp = TempDir::new().unwrap();
        let runner = BenchmarkRunner::new(registry(), ResultStore::new(temp.path()));
        let tasks = vec![task("t1", "What is 6 x 7?"), task("t2", "boom")];

        let results = runner.run_all(&tasks).await;

        assert_eq!(results.len(), 4);
        assert_eq!(results.iter().filter(|r| r.error.is_none()).count(), 3);

        let failed = results.iter().find(|r| r.is_error()).unwrap();
        assert_eq!(failed.model_id, "fragile");
        assert_eq!(failed.task_id, "t2");
        assert_eq!(failed.accuracy, 0.0);
        assert_eq!(failed.latency, 0.0);
        assert!(failed.completion.is_none());
        assert!(failed.error.as_deref().unwrap().contains("backend exploded"));

        assert_eq!(ResultStore::new(temp.path()).load_all().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_matrix_order_follows_registry() {
        let temp = TempDir::new().unwrap();
        let runner = BenchmarkRunner::new(registry(), ResultStore::new(temp.path()));
        let tasks = vec![task("t1", "a"), task("t2", "b")];

        let cells: Vec<(String, String)> = runner
            .run_all(&tasks)
            .await
            .into_iter()
            .map(|r| (r.model_id, r.task_id))
            .collect();

        assert_eq!(
            cells,
            vec![
                ("steady".to_string(), "t1".to_string()),
                ("steady".to_string(), "t2".to_string()),
                ("fragile".to_string(), "t1".to_string()),
                ("fragile".to_string(), "t2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_successful_cell_is_scored() {
        let temp = TempDir::new().unwrap();
        let runner = BenchmarkRunner::new(registry(), ResultStore::new(temp.path()));

        let result = runner.run_cell("steady", &task("t1", "q")).await;

        assert_eq!(result.accuracy, 1.0);
        assert_eq!(result.latency, 2.0);
        assert_eq!(result.output_tokens, Some(4));
        assert_eq!(result.qualitative_score, None);
    }

    #[tokio::test]
    async fn test_unknown_model_is_errored() {
        let temp = TempDir::new().unwrap();
        let runner = BenchmarkRunner::new(registry(), ResultStore::new(temp.path()));

        let result = runner.run_cell("ghost", &task("t1", "q")).await;

        assert_eq!(result.error.as_deref(), Some("Unknown model: ghost"));
        assert_eq!(result.latency, 0.0);
    }

    #[tokio::test]
    async fn test_scorer_panic_is_isolated() {
        let temp = TempDir::new().unwrap();
        let runner = BenchmarkRunner::with_scorer(
            registry(),
            Arc::new(PanickingScorer),
            ResultStore::new(temp.path()),
        );

        let result = runner.run_cell("steady", &task("t1", "q")).await;

        assert!(result.error.as_deref().unwrap().contains("scorer bug"));
        assert!(result.completion.is_none());
    }

    #[tokio::test]
    async fn test_persist_failure_still_returns_result() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not_a_dir");
        std::fs::write(&blocker, "file").unwrap();
        let runner = BenchmarkRunner::new(registry(), ResultStore::new(blocker.join("raw")));

        let result = runner.run_cell("steady", &task("t1", "q")).await;

        assert!(!result.is_error());
        assert_eq!(result.accuracy, 1.0);
    }

    #[tokio::test]
    async fn test_failure_outcome_keeps_latency() {
        struct Down;

        #[async_trait]
        impl ModelClient for Down {
            async fn invoke(&self, _prompt: &str) -> Outcome {
                Outcome::Failure {
                    error: "Request timeout after 5s".to_string(),
                    latency: 5.0,
                }
            }
        }

        let temp = TempDir::new().unwrap();
        let mut registry = ClientRegistry::new();
        registry.register("down", Arc::new(Down));
        let runner = BenchmarkRunner::new(registry, ResultStore::new(temp.path()));

        let result = runner.run_cell("down", &task("t1", "q")).await;

        assert_eq!(result.latency, 5.0);
        assert_eq!(result.error.as_deref(), Some("Request timeout after 5s"));
    }
}
