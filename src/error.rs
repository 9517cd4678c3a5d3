//! Error types for the provider layer and the Sage orchestrator.
//!
//! Every failure class a caller might want to tell apart gets its own
//! variant; the HTTP layer above this crate maps them to status codes.

use thiserror::Error;

use crate::ai::ProviderKind;

/// Errors produced by provider clients and the provider factory.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A required configuration value is missing or invalid. Fatal at
    /// construction, never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// The requested provider token is not part of the supported set.
    #[error("unsupported AI provider: {0}")]
    UnsupportedProvider(String),

    /// The provider is declared but its ask path is not built yet. Kept
    /// distinct from transport failures so callers can tell "missing
    /// feature" from "outage".
    #[error("{0} service not yet implemented")]
    NotImplemented(ProviderKind),

    /// The HTTP request never completed (connection refused, DNS failure,
    /// timeout, cancelled in flight).
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status. The raw body is kept
    /// for diagnosability.
    #[error("HTTP {status} from {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The body could not be decoded as the expected JSON shape.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The provider embedded its own error object in an otherwise
    /// well-formed payload. A 200 status does not imply success.
    #[error("API error from {endpoint}: {message}")]
    Api { endpoint: String, message: String },

    /// A structurally valid response with nothing in it.
    #[error("no choices in response from {endpoint}")]
    Empty { endpoint: String },
}

/// Errors surfaced by the Sage orchestrator.
#[derive(Debug, Error)]
pub enum SageError {
    /// The selected provider could not answer. The provider error is
    /// wrapped unchanged; the orchestrator performs no recovery of its own.
    #[error("AI service request failed: {0}")]
    Request(#[source] ProviderError),

    /// The question failed orchestrator-side validation.
    #[error("invalid question: {0}")]
    InvalidQuestion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_implemented_message_is_labelled() {
        let err = ProviderError::NotImplemented(ProviderKind::Anthropic);
        assert!(err.to_string().contains("not yet implemented"));
        assert!(err.to_string().contains("anthropic"));
    }

    #[test]
    fn test_unsupported_provider_message() {
        let err = ProviderError::UnsupportedProvider("gemini".to_string());
        assert_eq!(err.to_string(), "unsupported AI provider: gemini");
    }

    #[test]
    fn test_request_wrap_keeps_provider_message() {
        let inner = ProviderError::Empty {
            endpoint: "http://localhost:8000/generate".to_string(),
        };
        let err = SageError::Request(inner);
        let text = err.to_string();
        assert!(text.starts_with("AI service request failed:"));
        assert!(text.contains("no choices in response"));
    }
}
