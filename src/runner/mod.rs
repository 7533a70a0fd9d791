//! @ai:module:intent Model clients, client registry and matrix execution
//! @ai:module:layer infrastructure
//! @ai:module:public_api ModelClient, Outcome, ClientRegistry, BenchmarkRunner, RateLimiter

pub mod client;
pub mod direct_client;
pub mod executor;
pub mod local_client;
pub mod orchestrator_client;
pub mod rate_limiter;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use client::{Completion, Meta, MockClient, ModelClient, Outcome};
pub use direct_client::{DirectApiClient, DirectApiSettings};
pub use executor::BenchmarkRunner;
pub use local_client::{LocalDaemonClient, LocalDaemonSettings};
pub use orchestrator_client::{CommandOrchestrator, OrchestratedClient, Orchestrator};
pub use rate_limiter::RateLimiter;
pub use registry::ClientRegistry;
