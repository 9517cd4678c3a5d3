//! AI provider layer.
//!
//! One capability contract ([`AIService`]), four backends, one factory.
//! The orchestrator in [`crate::sage`] holds a single boxed service chosen
//! at startup; provider selection is a deployment-time decision, not a
//! per-call one.

pub mod anthropic;
pub mod factory;
pub mod local;
pub mod ollama;
pub mod openai;
pub mod service;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export key types
pub use factory::build_service;
pub use service::AIService;
pub use types::{AskRequest, AskResponse, Capabilities, ProviderConfig, ProviderInfo, ProviderKind};
