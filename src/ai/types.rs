//! Universal types for the AI service layer.
//!
//! These types isolate the orchestrator and its callers from the wire
//! formats of the individual providers.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// The supported AI backends. A closed set: adding a provider means adding
/// a variant, a client, and a factory arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Hosted OpenAI chat-completion models.
    OpenAI,
    /// Anthropic Claude (declared, ask path not built yet).
    Anthropic,
    /// A self-hosted OpenAI-compatible server (vLLM, FastChat, ...).
    Local,
    /// A local Ollama daemon.
    Ollama,
}

impl ProviderKind {
    /// Token used in config files, logs, and responses.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Local => "local",
            Self::Ollama => "ollama",
        }
    }

    /// Get all supported providers.
    pub fn all() -> Vec<Self> {
        vec![Self::OpenAI, Self::Anthropic, Self::Local, Self::Ollama]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "local" => Ok(Self::Local),
            "ollama" => Ok(Self::Ollama),
            other => Err(ProviderError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Option map handed to the provider factory.
///
/// Every field is optional; each client applies its own defaults. Only the
/// OpenAI client demands a value (`api_key`) up front, since local
/// providers are expected to work out of the box against common defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A single question bound for a provider.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passage_text: Option<String>,
    /// Full system prompt. Every provider must transmit this faithfully;
    /// it is never optional and never truncated.
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Caller identifier, passed through for downstream logging and
    /// persistence; not used by the providers themselves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// A normalized answer, constructed fresh per call and never mutated after
/// return.
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub answer: String,
    /// Wall-clock time for the call. The orchestrator overwrites this with
    /// its own measurement.
    pub response_time: Duration,
    /// Provider-reported usage; 0 when the provider reports none.
    pub tokens_used: u32,
    pub model: String,
    pub provider: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

/// What a provider/model combination supports. Computed by static lookup,
/// never by a network call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capabilities {
    pub supports_streaming: bool,
    pub supports_conversations: bool,
    pub supported_languages: Vec<String>,
    pub max_tokens: u32,
    pub max_context_length: u32,
    pub supports_documents: bool,
    pub supports_images: bool,
}

/// Static provider metadata for display and health payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderInfo {
    pub name: String,
    pub provider: ProviderKind,
    pub model: String,
    pub version: String,
    pub description: String,
    pub is_local: bool,
    pub cost: String,
}
