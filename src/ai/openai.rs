//! OpenAI chat-completions client.
//!
//! Implements [`AIService`] against the hosted OpenAI API. Capability and
//! cost tables are static lookups keyed by model name.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::service::AIService;
use super::types::{AskRequest, AskResponse, Capabilities, ProviderConfig, ProviderInfo, ProviderKind};
use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for hosted OpenAI models.
#[derive(Debug)]
pub struct OpenAIService {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: Client,
}

impl OpenAIService {
    /// Build a client from the option map.
    ///
    /// The API key is validated here: a hosted paid provider must not run
    /// without a credential. Everything else falls back to defaults.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = match &config.api_key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => return Err(ProviderError::Config("openai api_key is required".to_string())),
        };

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ProviderError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            api_key,
            model: config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            client,
        })
    }
}

#[async_trait]
impl AIService for OpenAIService {
    async fn ask(&self, req: &AskRequest) -> Result<AskResponse, ProviderError> {
        let endpoint = format!("{}/chat/completions", self.base_url);

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: req.context.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: req.question.clone(),
                },
            ],
            temperature: req.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: req.max_tokens.unwrap_or(self.max_tokens),
            stream: false,
        };

        debug!(model = %self.model, "sending chat completion request");
        let started = Instant::now();

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ProviderError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;

        let parsed: ChatResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(source) if status.is_success() => {
                return Err(ProviderError::Decode { endpoint, source });
            }
            Err(_) => {
                return Err(ProviderError::Status {
                    endpoint,
                    status,
                    body: text,
                });
            }
        };

        // A provider-embedded error object wins over the HTTP status.
        if let Some(error) = parsed.error {
            return Err(ProviderError::Api {
                endpoint,
                message: error.message,
            });
        }

        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint,
                status,
                body: text,
            });
        }

        let choice = match parsed.choices.into_iter().next() {
            Some(choice) => choice,
            None => return Err(ProviderError::Empty { endpoint }),
        };

        Ok(AskResponse {
            answer: choice.message.content,
            response_time: started.elapsed(),
            tokens_used: parsed.usage.map(|u| u.total_tokens).unwrap_or(0),
            model: if parsed.model.is_empty() {
                self.model.clone()
            } else {
                parsed.model
            },
            provider: ProviderKind::OpenAI,
            confidence: None,
            sources: Vec::new(),
        })
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_streaming: true,
            supports_conversations: true,
            supported_languages: ["en", "es", "fr", "de", "it", "pt", "ru", "ja", "ko", "zh"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_tokens: self.max_tokens,
            max_context_length: model_context_length(&self.model),
            supports_documents: true,
            supports_images: is_vision_model(&self.model),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "OpenAI".to_string(),
            provider: ProviderKind::OpenAI,
            model: self.model.clone(),
            version: "1.0".to_string(),
            description: "OpenAI GPT models for classical education".to_string(),
            is_local: false,
            cost: cost_info(&self.model).to_string(),
        }
    }

    /// There is no lightweight ping route, so issue the smallest real
    /// request. Note this spends a few tokens of quota per probe.
    async fn health_check(&self) -> Result<(), ProviderError> {
        let probe = AskRequest {
            question: "Test".to_string(),
            context: "You are a helpful assistant. Respond with just 'OK'.".to_string(),
            max_tokens: Some(5),
            ..AskRequest::default()
        };

        self.ask(&probe).await.map(|_| ())
    }
}

/// Context window sizes for known OpenAI models, with a conservative
/// default for anything unrecognized.
fn model_context_length(model: &str) -> u32 {
    match model {
        "gpt-4" => 8192,
        "gpt-4-32k" => 32_768,
        "gpt-4-turbo-preview" | "gpt-4-0125-preview" => 128_000,
        "gpt-3.5-turbo" => 4096,
        "gpt-3.5-turbo-16k" => 16_384,
        _ => 4096,
    }
}

/// Vision support is an allow-list of exact model names.
fn is_vision_model(model: &str) -> bool {
    matches!(model, "gpt-4-vision-preview" | "gpt-4-turbo" | "gpt-4o")
}

fn cost_info(model: &str) -> &'static str {
    match model {
        "gpt-4" => "~$0.03/1K tokens (input), ~$0.06/1K tokens (output)",
        "gpt-4-turbo-preview" => "~$0.01/1K tokens (input), ~$0.03/1K tokens (output)",
        "gpt-3.5-turbo" => "~$0.001/1K tokens (input), ~$0.002/1K tokens (output)",
        _ => "Variable pricing - check OpenAI pricing page",
    }
}

// -----------------------------------------------------------------------------
// OpenAI wire format
// -----------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}
