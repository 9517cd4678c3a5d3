//! The provider abstraction.
//!
//! This trait defines the capability contract every backend satisfies,
//! whether it's a hosted API (OpenAI) or a local daemon (Ollama). The
//! orchestrator holds any of them behind a `Box<dyn AIService>`.

use std::fmt::Debug;

use async_trait::async_trait;

use super::types::{AskRequest, AskResponse, Capabilities, ProviderInfo};
use crate::error::ProviderError;

/// The capability set every provider variant implements with identical
/// semantics.
///
/// Calls are independent and safe to issue concurrently: clients hold only
/// immutable configuration plus one long-lived `reqwest::Client` whose
/// connection pool is shared across calls. To bound a call, wrap it in
/// `tokio::time::timeout`; dropping the returned future aborts the
/// in-flight HTTP request.
#[async_trait]
pub trait AIService: Send + Sync + Debug {
    /// Send one question, get one normalized answer.
    ///
    /// On any non-success condition (transport failure, non-2xx status,
    /// malformed payload, provider-reported error object, empty choice
    /// list) this returns an error, never a partially-populated response.
    /// No internal retries, except the local-HTTP client's documented
    /// candidate-endpoint fallback.
    async fn ask(&self, req: &AskRequest) -> Result<AskResponse, ProviderError>;

    /// Static capability table for this provider/model pair. No I/O.
    fn capabilities(&self) -> Capabilities;

    /// Static provider metadata for display and health payloads. No I/O.
    fn provider_info(&self) -> ProviderInfo;

    /// Reachability probe. Safe to call frequently; some providers have no
    /// ping route and fall back to a minimal real generation.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
