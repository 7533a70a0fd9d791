//! @ai:module:intent Client for a local inference daemon speaking the Ollama protocol
//! @ai:module:layer infrastructure
//! @ai:module:public_api LocalDaemonClient, LocalDaemonSettings
//! @ai:module:stateless true

use crate::error::ClientError;
use crate::runner::client::{with_timeout, Completion, Meta, ModelClient, Outcome};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{Duration, Instant};

/// @ai:intent Connection settings for a local daemon
#[derive(Debug, Clone)]
pub struct LocalDaemonSettings {
    pub model: String,
    pub base_url: String,
    pub probe_timeout: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    total_duration: Option<u64>,
    load_duration: Option<u64>,
    prompt_eval_count: Option<u64>,
    eval_count: Option<u64>,
}

/// @ai:intent Probes the daemon before every call and reports a fixed sentinel when it is down
pub struct LocalDaemonClient {
    client: reqwest::Client,
    settings: LocalDaemonSettings,
}

impl LocalDaemonClient {
    /// @ai:intent Create a new local daemon client
    /// @ai:effects pure
    pub fn new(settings: LocalDaemonSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    /// @ai:intent Check the daemon answers its model listing endpoint
    /// @ai:effects network
    async fn probe(&self) -> bool {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.settings.probe_timeout)
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => true,
            Ok(r) => {
                tracing::debug!("Probe of {} returned {}", self.settings.base_url, r.status());
                false
            }
            Err(e) => {
                tracing::debug!("Probe of {} failed: {}", self.settings.base_url, e);
                false
            }
        }
    }

    /// @ai:intent Run a non-streaming generation
    /// @ai:effects network
    async fn generate(&self, prompt: &str) -> Result<Completion, ClientError> {
        let request = GenerateRequest {
            model: &self.settings.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(self.url("/api/generate"))
            .timeout(self.settings.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            return Err(ClientError::Protocol(format!("daemon error: {}", status)));
        }

        let body: GenerateResponse = response.json().await?;

        let mut meta = Meta::new();
        meta.insert("model".to_string(), json!(self.settings.model));
        meta.insert("provider".to_string(), json!("ollama"));
        meta.insert("total_duration".to_string(), json!(body.total_duration));
        meta.insert("load_duration".to_string(), json!(body.load_duration));
        meta.insert("prompt_eval_count".to_string(), json!(body.prompt_eval_count));
        meta.insert("eval_count".to_string(), json!(body.eval_count));

        Ok(Completion {
            text: body.response,
            meta,
        })
    }
}

#[async_trait]
impl ModelClient for LocalDaemonClient {
    /// @ai:intent Probe, then generate; every failure is reported as unavailable
    /// @ai:post an unreachable daemon yields latency 0 and no generate call
    /// @ai:post other failures report latency measured from before the probe
    /// @ai:effects network
    async fn invoke(&self, prompt: &str) -> Outcome {
        let started = Instant::now();

        if !self.probe().await {
            tracing::warn!(
                "{} is not reachable at {}",
                self.settings.model,
                self.settings.base_url
            );
            return Outcome::Failure {
                error: ClientError::Unavailable.to_string(),
                latency: 0.0,
            };
        }

        let result = with_timeout(self.settings.timeout, self.generate(prompt)).await;

        match Outcome::from_call(result, started) {
            Outcome::Failure { error, latency } => {
                tracing::warn!("{} generation failed: {}", self.settings.model, error);
                Outcome::Failure {
                    error: ClientError::Unavailable.to_string(),
                    latency,
                }
            }
            success => success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MODEL_NOT_AVAILABLE;
    use crate::runner::test_support::closed_port_url;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: String) -> LocalDaemonSettings {
        LocalDaemonSettings {
            model: "qwen3-coder:30b".to_string(),
            base_url,
            probe_timeout: Duration::from_secs(2),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_unreachable_daemon_is_not_available() {
        let client = LocalDaemonClient::new(settings(closed_port_url().await)).unwrap();

        assert_eq!(
            client.invoke("Test prompt").await,
            Outcome::Failure {
                error: MODEL_NOT_AVAILABLE.to_string(),
                latency: 0.0,
            }
        );
    }

    #[tokio::test]
    async fn test_probe_then_generate() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "qwen3-coder:30b",
                "prompt": "Write a program",
                "stream": false
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "fn main() {}", "eval_count": 12})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = LocalDaemonClient::new(settings(mock_server.uri())).unwrap();

        match client.invoke("Write a program").await {
            Outcome::Success { completion, meta, .. } => {
                assert_eq!(completion, "fn main() {}");
                assert_eq!(meta["eval_count"], 12);
                assert_eq!(meta["provider"], "ollama");
            }
            other => panic!("expected success, got {:?}", other),
        }

        let requests = mock_server.received_requests().await.unwrap();
        let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
        assert_eq!(paths, vec!["/api/tags", "/api/generate"]);
    }

    #[tokio::test]
    async fn test_failed_probe_skips_generate() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "loading"})))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = LocalDaemonClient::new(settings(mock_server.uri())).unwrap();
        let outcome = client.invoke("Test prompt").await;

        assert_eq!(
            outcome,
            Outcome::Failure {
                error: MODEL_NOT_AVAILABLE.to_string(),
                latency: 0.0,
            }
        );
    }

    #[tokio::test]
    async fn test_failed_generate_latency_includes_probe() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"models": []}))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = LocalDaemonClient::new(settings(mock_server.uri())).unwrap();

        match client.invoke("Test prompt").await {
            Outcome::Failure { error, latency } => {
                assert_eq!(error, MODEL_NOT_AVAILABLE);
                assert!(latency >= 0.2, "latency {} excludes the probe", latency);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
