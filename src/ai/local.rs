//! Client for self-hosted OpenAI-compatible servers (vLLM, FastChat, ...).
//!
//! The server location is configured but the exact route is not assumed:
//! `ask` walks an ordered list of candidate endpoints and settles on the
//! first that returns a structurally valid completion. Probes are
//! sequential, never concurrent, and only the last error survives.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::service::AIService;
use super::types::{AskRequest, AskResponse, Capabilities, ProviderConfig, ProviderInfo, ProviderKind};
use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_MODEL: &str = "sage-7b";
const DEFAULT_MAX_TOKENS: u32 = 2048;
const DEFAULT_TEMPERATURE: f32 = 0.7;
// Local models may need to load weights on first call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat-completion routes tried in order against a server of unknown shape.
const CANDIDATE_ENDPOINTS: &[&str] = &["/v1/chat/completions", "/chat/completions", "/generate"];

/// Conventional health routes probed before falling back to a real call.
const HEALTH_ENDPOINTS: &[&str] = &["/health", "/v1/health", "/ping"];

/// Stop tokens commonly honoured by open chat models.
const STOP_TOKENS: &[&str] = &["<|endoftext|>", "<|end|>", "</s>"];

/// Client for a self-hosted OpenAI-compatible server.
#[derive(Debug)]
pub struct LocalLLMService {
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    api_key: Option<String>,
    client: Client,
}

impl LocalLLMService {
    /// Build a client from the option map. Everything is defaulted; local
    /// servers are expected to work out of the box, and problems surface
    /// on first use.
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
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
            client,
        })
    }

    /// One full attempt against one candidate: request, status check, body
    /// decode, provider-error check, empty-choices check.
    async fn try_endpoint(
        &self,
        endpoint: &str,
        body: &ChatRequest,
    ) -> Result<(String, u32, String), ProviderError> {
        let mut request = self.client.post(endpoint).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|source| ProviderError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ProviderError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint: endpoint.to_string(),
                status,
                body: text,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|source| ProviderError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })?;

        if let Some(error) = parsed.error {
            return Err(ProviderError::Api {
                endpoint: endpoint.to_string(),
                message: error.message,
            });
        }

        let choice = match parsed.choices.into_iter().next() {
            Some(choice) => choice,
            None => {
                return Err(ProviderError::Empty {
                    endpoint: endpoint.to_string(),
                })
            }
        };

        Ok((
            choice.message.content,
            parsed.usage.map(|u| u.total_tokens).unwrap_or(0),
            parsed.model,
        ))
    }
}

#[async_trait]
impl AIService for LocalLLMService {
    async fn ask(&self, req: &AskRequest) -> Result<AskResponse, ProviderError> {
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
            temperature: req.temperature.unwrap_or(self.temperature),
            max_tokens: req.max_tokens.unwrap_or(self.max_tokens),
            stream: false,
            stop: STOP_TOKENS.iter().map(|s| s.to_string()).collect(),
        };

        let started = Instant::now();
        let mut last_error = None;

        for path in CANDIDATE_ENDPOINTS {
            let endpoint = format!("{}{}", self.base_url, path);
            match self.try_endpoint(&endpoint, &body).await {
                Ok((answer, tokens_used, model)) => {
                    debug!(%endpoint, "candidate endpoint answered");
                    return Ok(AskResponse {
                        answer,
                        response_time: started.elapsed(),
                        tokens_used,
                        model: if model.is_empty() { self.model.clone() } else { model },
                        provider: ProviderKind::Local,
                        confidence: None,
                        sources: Vec::new(),
                    });
                }
                Err(err) => {
                    warn!(%endpoint, error = %err, "candidate endpoint failed");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::Config("no candidate endpoints configured".to_string())
        }))
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_streaming: false,
            supports_conversations: true,
            // Depends on what the local model was trained on.
            supported_languages: vec!["en".to_string()],
            max_tokens: self.max_tokens,
            max_context_length: local_model_context_length(&self.model),
            supports_documents: true,
            supports_images: false,
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Local LLM".to_string(),
            provider: ProviderKind::Local,
            model: self.model.clone(),
            version: "1.0".to_string(),
            description: "Self-hosted LLM optimized for classical education".to_string(),
            is_local: true,
            cost: "Free (local compute only)".to_string(),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        for path in HEALTH_ENDPOINTS {
            let endpoint = format!("{}{}", self.base_url, path);
            match self.client.get(&endpoint).send().await {
                Ok(response) if response.status() == StatusCode::OK => return Ok(()),
                Ok(_) | Err(_) => continue,
            }
        }

        // No conventional health route answered; probe with the smallest
        // real generation instead.
        debug!("no health endpoint answered, falling back to a minimal generation");
        let probe = AskRequest {
            question: "Hello".to_string(),
            context: "You are a helpful assistant. Respond with just 'Hi'.".to_string(),
            max_tokens: Some(5),
            ..AskRequest::default()
        };

        self.ask(&probe).await.map(|_| ())
    }
}

/// Best-effort context-window estimate from parameter-count substrings in
/// the model name. This is a heuristic, not an authoritative lookup;
/// unrecognized names get a conservative default.
fn local_model_context_length(model: &str) -> u32 {
    let lower = model.to_lowercase();
    if lower.contains("7b") {
        4096
    } else if lower.contains("13b") {
        4096
    } else if lower.contains("30b") {
        2048
    } else if lower.contains("70b") {
        4096
    } else {
        2048
    }
}

// -----------------------------------------------------------------------------
// Wire format (OpenAI-compatible)
// -----------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    stop: Vec<String>,
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
