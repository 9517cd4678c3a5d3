//! Anthropic Claude placeholder.
//!
//! The variant is declared so configuration and capability listings work,
//! but the ask path is not built yet. The factory refuses to select it with
//! a labelled "not yet implemented" error rather than a generic failure, so
//! callers and UIs can tell a missing feature from an outage.

use async_trait::async_trait;

use super::service::AIService;
use super::types::{AskRequest, AskResponse, Capabilities, ProviderConfig, ProviderInfo, ProviderKind};
use crate::error::ProviderError;

const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_MAX_TOKENS: u32 = 100_000;

/// Placeholder client. Metadata works; asking does not.
#[derive(Debug)]
pub struct AnthropicService {
    model: String,
    max_tokens: u32,
}

impl AnthropicService {
    /// Build the placeholder. Infallible so capability/info listings can
    /// still show the variant; the factory is what refuses to select it.
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            model: config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

#[async_trait]
impl AIService for AnthropicService {
    async fn ask(&self, _req: &AskRequest) -> Result<AskResponse, ProviderError> {
        Err(ProviderError::NotImplemented(ProviderKind::Anthropic))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_streaming: true,
            supports_conversations: true,
            supported_languages: ["en", "es", "fr", "de", "it", "pt", "ja", "ko", "zh"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_tokens: self.max_tokens,
            max_context_length: 200_000,
            supports_documents: true,
            supports_images: true,
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Anthropic Claude".to_string(),
            provider: ProviderKind::Anthropic,
            model: self.model.clone(),
            version: "3.5".to_string(),
            description: "Advanced AI assistant by Anthropic with strong reasoning capabilities"
                .to_string(),
            is_local: false,
            cost: "$3/$15 per million tokens (input/output)".to_string(),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Err(ProviderError::NotImplemented(ProviderKind::Anthropic))
    }
}
