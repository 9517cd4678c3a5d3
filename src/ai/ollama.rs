//! Ollama client.
//!
//! Ollama speaks its own single-prompt generate API rather than the chat
//! array format: system context, passage, and question are flattened into
//! one prompt string, and token usage comes back as eval counters.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::service::AIService;
use super::types::{AskRequest, AskResponse, Capabilities, ProviderConfig, ProviderInfo, ProviderKind};
use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:8b";
const DEFAULT_MAX_TOKENS: u32 = 2048;
const DEFAULT_TEMPERATURE: f32 = 0.7;
// Ollama can be slow on first load.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for a local Ollama daemon.
#[derive(Debug)]
pub struct OllamaService {
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    client: Client,
}

impl OllamaService {
    /// Build a client from the option map. Everything is defaulted; a
    /// missing daemon only shows up on first use.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ProviderError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            client,
        })
    }
}

/// Flatten context, passage, and question into one prompt, blank-line
/// separated, in that order.
fn build_prompt(req: &AskRequest) -> String {
    let mut prompt = String::new();

    if !req.context.is_empty() {
        prompt.push_str(&req.context);
        prompt.push_str("\n\n");
    }

    if let Some(passage) = &req.passage_text {
        if !passage.is_empty() {
            prompt.push_str(&format!("Passage: {passage}\n\n"));
        }
    }

    prompt.push_str(&req.question);
    prompt
}

#[async_trait]
impl AIService for OllamaService {
    async fn ask(&self, req: &AskRequest) -> Result<AskResponse, ProviderError> {
        let endpoint = format!("{}/api/generate", self.base_url);

        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: build_prompt(req),
            stream: false,
            options: GenerateOptions {
                temperature: req.temperature.unwrap_or(self.temperature),
                num_predict: req.max_tokens.unwrap_or(self.max_tokens),
                top_k: 40,
                top_p: 0.9,
            },
        };

        debug!(model = %self.model, "sending generate request");
        let started = Instant::now();

        let response = self
            .client
            .post(&endpoint)
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

        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint,
                status,
                body: text,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|source| ProviderError::Decode {
                endpoint,
                source,
            })?;

        Ok(AskResponse {
            answer: parsed.response,
            response_time: started.elapsed(),
            // Eval counters are telemetry, not a billing-grade figure.
            tokens_used: parsed.eval_count + parsed.prompt_eval_count,
            model: if parsed.model.is_empty() { self.model.clone() } else { parsed.model },
            provider: ProviderKind::Ollama,
            confidence: None,
            sources: Vec::new(),
        })
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_streaming: true,
            supports_conversations: true,
            // Depends on the model pulled.
            supported_languages: vec!["en".to_string()],
            max_tokens: self.max_tokens,
            max_context_length: ollama_model_context_length(&self.model),
            supports_documents: true,
            supports_images: false,
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Ollama".to_string(),
            provider: ProviderKind::Ollama,
            model: self.model.clone(),
            version: "1.0".to_string(),
            description: "Local LLM runner with easy model management".to_string(),
            is_local: true,
            cost: "Free (local compute only)".to_string(),
        }
    }

    /// A 200 from `/api/tags` means the daemon is up and can list its
    /// models. It does not guarantee the configured model is pulled.
    async fn health_check(&self) -> Result<(), ProviderError> {
        let endpoint = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                endpoint,
                status,
                body,
            });
        }

        Ok(())
    }
}

/// Context windows for common Ollama model tags. Exact-tag lookup with a
/// conservative default: tags not listed here get 4096, not a guess.
fn ollama_model_context_length(model: &str) -> u32 {
    match model {
        "llama3:8b" | "llama3:70b" => 8192,
        "llama3.1:8b" | "llama3.1:70b" => 131_072,
        "llama3.2:3b" => 131_072,
        "mistral:7b" => 8192,
        "mixtral:8x7b" => 32_768,
        "codellama:13b" => 16_384,
        "phi3:3.8b" => 4096,
        "qwen2:7b" => 32_768,
        "gemma2:9b" => 8192,
        "neural-chat:7b" => 4096,
        _ => 4096,
    }
}

// -----------------------------------------------------------------------------
// Ollama wire format
// -----------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
    top_k: u32,
    top_p: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    response: String,
    #[serde(default)]
    eval_count: u32,
    #[serde(default)]
    prompt_eval_count: u32,
}
