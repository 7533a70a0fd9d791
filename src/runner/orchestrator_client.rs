//! @ai:module:intent Client backed by an external multi-agent orchestrator
//! @ai:module:layer infrastructure
//! @ai:module:public_api Orchestrator, CommandOrchestrator, OrchestratedClient
//! @ai:module:stateless true

use crate::error::ClientError;
use crate::runner::client::{with_timeout, Completion, Meta, ModelClient, Outcome};
use async_trait::async_trait;
use serde_json::json;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// @ai:intent Opaque collaborator that turns a prompt into a synthesized answer
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// @ai:intent Run the orchestration for one prompt
    /// @ai:effects io
    async fn orchestrate(&self, prompt: &str) -> Result<String, ClientError>;
}

/// @ai:intent Orchestrator run as a subprocess: prompt on stdin, answer on stdout
pub struct CommandOrchestrator {
    command: String,
    args: Vec<String>,
}

impl CommandOrchestrator {
    /// @ai:intent Create an orchestrator invoking `command args...`
    /// @ai:effects pure
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

#[async_trait]
impl Orchestrator for CommandOrchestrator {
    /// @ai:intent Spawn the orchestrator and collect its stdout
    /// @ai:post the child is killed if this future is dropped
    /// @ai:effects process, io
    async fn orchestrate(&self, prompt: &str) -> Result<String, ClientError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ClientError::Transport(format!("failed to start {}: {}", self.command, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let input = prompt.to_string();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    tracing::debug!("Orchestrator closed stdin early: {}", e);
                }
            });
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClientError::Transport(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// @ai:intent Model client that delegates to an orchestrator and times the whole call
pub struct OrchestratedClient {
    orchestrator: Box<dyn Orchestrator>,
    model: Option<String>,
    agent_count: u32,
    timeout: Duration,
}

impl OrchestratedClient {
    /// @ai:intent Wrap an orchestrator
    /// @ai:effects pure
    pub fn new(
        orchestrator: Box<dyn Orchestrator>,
        model: Option<String>,
        agent_count: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            orchestrator,
            model,
            agent_count,
            timeout,
        }
    }

    fn meta(&self) -> Meta {
        let mut meta = Meta::new();
        meta.insert("provider".to_string(), json!("orchestrator"));
        meta.insert("agent_count".to_string(), json!(self.agent_count));
        if let Some(model) = &self.model {
            meta.insert("model".to_string(), json!(model));
        }
        meta
    }
}

#[async_trait]
impl ModelClient for OrchestratedClient {
    /// @ai:intent Run the orchestrator under the configured timeout
    /// @ai:effects process, io
    async fn invoke(&self, prompt: &str) -> Outcome {
        let started = Instant::now();

        let result = with_timeout(self.timeout, async {
            let text = self.orchestrator.orchestrate(prompt).await?;
            Ok::<_, ClientError>(Completion {
                text,
                meta: self.meta(),
            })
        })
        .await;

        if let Err(e) = &result {
            tracing::warn!("Orchestrated call failed: {}", e);
        }

        Outcome::from_call(result, started)
    }
}
