//! @ai:module:intent Registry mapping model identifiers to client implementations
//! @ai:module:layer application
//! @ai:module:public_api ClientRegistry
//! @ai:module:stateless false

use crate::config::{BackendConfig, ModelConfig};
use crate::runner::client::{MockClient, ModelClient};
use crate::runner::direct_client::{DirectApiClient, DirectApiSettings};
use crate::runner::local_client::{LocalDaemonClient, LocalDaemonSettings};
use crate::runner::orchestrator_client::{CommandOrchestrator, OrchestratedClient};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

/// @ai:intent Ordered capability table of model clients, built once from configuration
#[derive(Default, Clone)]
pub struct ClientRegistry {
    entries: Vec<(String, Arc<dyn ModelClient>)>,
}

impl ClientRegistry {
    /// @ai:intent Create an empty registry
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Build a client for every configured model, in configuration order
    /// @ai:effects env
    pub fn from_config(models: &[ModelConfig]) -> Result<Self> {
        let mut registry = Self::new();

        for model in models {
            let client = build_client(&model.backend)
                .with_context(|| format!("Failed to build client for model {}", model.id))?;
            tracing::debug!("Registered {} ({})", model.id, model.backend.kind());
            registry.register(model.id.clone(), client);
        }

        Ok(registry)
    }

    /// @ai:intent Registry where every model answers with a canned response
    /// @ai:effects pure
    pub fn dry_run(models: &[ModelConfig], response: &str) -> Self {
        let mut registry = Self::new();

        for model in models {
            registry.register(
                model.id.clone(),
                Arc::new(MockClient::new(response).with_latency(0.001)),
            );
        }

        registry
    }

    /// @ai:intent Add a client, replacing any existing entry with the same id in place
    /// @ai:effects state:write
    pub fn register(&mut self, model_id: impl Into<String>, client: Arc<dyn ModelClient>) {
        let model_id = model_id.into();

        match self.entries.iter_mut().find(|(id, _)| *id == model_id) {
            Some(entry) => entry.1 = client,
            None => self.entries.push((model_id, client)),
        }
    }

    /// @ai:intent Look up a client by model id
    /// @ai:effects pure
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn ModelClient>> {
        self.entries
            .iter()
            .find(|(id, _)| id == model_id)
            .map(|(_, client)| Arc::clone(client))
    }

    /// @ai:intent Model ids in registration order
    /// @ai:effects pure
    pub fn model_ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    /// @ai:intent Keep only the models accepted by a predicate
    /// @ai:effects state:write
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|(id, _)| keep(id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// @ai:intent Construct the client variant for a backend configuration
/// @ai:effects env
fn build_client(backend: &BackendConfig) -> Result<Arc<dyn ModelClient>> {
    let client: Arc<dyn ModelClient> = match backend {
        BackendConfig::Direct {
            model,
            base_url,
            api_key_env,
            provider,
            timeout_secs,
            requests_per_minute,
        } => Arc::new(DirectApiClient::from_env(
            DirectApiSettings {
                model: model.clone(),
                base_url: base_url.clone(),
                provider: provider.clone(),
                timeout: Duration::from_secs(*timeout_secs),
                requests_per_minute: *requests_per_minute,
            },
            api_key_env,
        )?),
        BackendConfig::Orchestrated {
            command,
            args,
            model,
            agent_count,
            timeout_secs,
        } => Arc::new(OrchestratedClient::new(
            Box::new(CommandOrchestrator::new(command.clone(), args.clone())),
            model.clone(),
            *agent_count,
            Duration::from_secs(*timeout_secs),
        )),
        BackendConfig::Local {
            model,
            base_url,
            probe_timeout_secs,
            timeout_secs,
        } => Arc::new(LocalDaemonClient::new(LocalDaemonSettings {
            model: model.clone(),
            base_url: base_url.clone(),
            probe_timeout: Duration::from_secs(*probe_timeout_secs),
            timeout: Duration::from_secs(*timeout_secs),
        })?),
        BackendConfig::Mock {
            response,
            latency_secs,
        } => {
            let client = MockClient::new(response.clone());
            Arc::new(match latency_secs {
                Some(latency) => client.with_latency(*latency),
                None => client,
            })
        }
    };

    Ok(client)
}
