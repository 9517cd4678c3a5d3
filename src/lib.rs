//! Sage: the AI tutor core of a classical e-reading platform.
//!
//! One orchestrator, four interchangeable backends:
//! - OpenAI chat completions
//! - Anthropic Claude (declared, ask path not built yet)
//! - Self-hosted OpenAI-compatible servers (vLLM, FastChat, ...)
//! - Ollama
//!
//! The platform's HTTP surface, storage, and auth live elsewhere; this
//! crate is the question-answering core they call into. Construct a
//! [`Sage`] once at startup and pass it to whatever needs it.

pub mod ai;
pub mod config;
pub mod error;
pub mod sage;

// Re-export key types
pub use ai::{
    build_service, AIService, AskRequest, AskResponse, Capabilities, ProviderConfig, ProviderInfo,
    ProviderKind,
};
pub use config::Config;
pub use error::{ProviderError, SageError};
pub use sage::{QuestionContext, Sage, MAX_QUESTION_CHARS};
