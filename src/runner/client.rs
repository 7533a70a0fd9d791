//! @ai:module:intent Model client capability shared by every backend
//! @ai:module:layer infrastructure
//! @ai:module:public_api ModelClient, Outcome, Completion, Meta, MockClient
//! @ai:module:stateless true

use crate::error::ClientError;
use async_trait::async_trait;
use serde_json::json;
use std::future::Future;
use std::time::{Duration, Instant};

/// Free-form backend metadata attached to a successful call
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// @ai:intent Result of invoking a backend once
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success {
        completion: String,
        /// Wall-clock seconds
        latency: f64,
        meta: Meta,
    },
    Failure {
        error: String,
        latency: f64,
    },
}

impl Outcome {
    /// @ai:intent Elapsed seconds reported by the backend call
    /// @ai:effects pure
    pub fn latency(&self) -> f64 {
        match self {
            Outcome::Success { latency, .. } | Outcome::Failure { latency, .. } => *latency,
        }
    }

    /// @ai:intent Whether the call produced a completion
    /// @ai:effects pure
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// @ai:intent Convert an internal call result into an outcome
    /// @ai:post timeouts report the configured limit as latency
    /// @ai:effects time
    pub(crate) fn from_call(result: Result<Completion, ClientError>, started: Instant) -> Self {
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(completion) => Outcome::Success {
                completion: completion.text,
                latency: elapsed,
                meta: completion.meta,
            },
            Err(ClientError::Timeout(limit)) => Outcome::Failure {
                error: ClientError::Timeout(limit).to_string(),
                latency: limit.as_secs_f64(),
            },
            Err(e) => Outcome::Failure {
                error: e.to_string(),
                latency: elapsed,
            },
        }
    }
}

/// @ai:intent Text and metadata returned by a backend before timing is attached
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub text: String,
    pub meta: Meta,
}

/// @ai:intent Turns a prompt into a completion-or-error outcome
///            Implementations must not panic or return early on transport errors;
///            everything is folded into `Outcome::Failure`
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// @ai:intent Send a prompt to the backend and time the call
    /// @ai:effects network
    async fn invoke(&self, prompt: &str) -> Outcome;
}

/// @ai:intent Bound a future by a timeout, mapping expiry to `ClientError::Timeout`
/// @ai:effects time
pub(crate) async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ClientError::Timeout(limit))?
}

/// @ai:intent Client returning a fixed response, for dry runs and tests
pub struct MockClient {
    response: String,
    latency: Option<f64>,
}

impl MockClient {
    /// @ai:intent Create a mock client that returns a fixed response
    /// @ai:effects pure
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            latency: None,
        }
    }

    /// @ai:intent Report a fixed latency instead of the measured one
    /// @ai:effects pure
    pub fn with_latency(mut self, seconds: f64) -> Self {
        self.latency = Some(seconds);
        self
    }
}

#[async_trait]
impl ModelClient for MockClient {
    /// @ai:intent Return mock response
    /// @ai:effects pure
    async fn invoke(&self, _prompt: &str) -> Outcome {
        let started = Instant::now();
        let mut meta = Meta::new();
        meta.insert("provider".to_string(), json!("mock"));

        let outcome = Outcome::from_call(
            Ok(Completion {
                text: self.response.clone(),
                meta,
            }),
            started,
        );

        match (outcome, self.latency) {
            (Outcome::Success { completion, meta, .. }, Some(latency)) => Outcome::Success {
                completion,
                latency,
                meta,
            },
            (outcome, _) => outcome,
        }
    }
}
