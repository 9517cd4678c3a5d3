//! The Sage orchestrator.
//!
//! Turns a raw question plus optional book context into a fully-formed
//! request, delegates to the selected provider, and stamps its own
//! wall-clock timing on the normalized answer. No retries, no provider
//! fallback: which backend answers is decided once, at construction.

use std::time::Instant;

use tracing::debug;

use crate::ai::{
    self, AIService, AskRequest, AskResponse, Capabilities, ProviderConfig, ProviderInfo,
    ProviderKind,
};
use crate::error::{ProviderError, SageError};

/// Upstream request binding enforces this limit too; it is re-checked here
/// so the library holds the line on its own.
pub const MAX_QUESTION_CHARS: usize = 5000;

// Balanced creativity for educational responses.
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1000;

const SYSTEM_PROMPT: &str = r#"You are the Sage, an AI tutor specializing in classical education and great works of literature, philosophy, history, and thought. Your role is to help students understand and engage with classical texts from the Western, Eastern, Islamic, and other great traditions.

Your expertise includes:
- Ancient philosophy (Plato, Aristotle, Stoics, Epicureans, etc.)
- Classical literature (Homer, Virgil, Ovid, etc.)
- Medieval thought (Augustine, Aquinas, Averroes, Maimonides, etc.)
- Renaissance humanism and Enlightenment philosophy
- Eastern classics (Confucius, Lao Tzu, Buddhist texts, etc.)
- Islamic golden age scholarship
- Historical context and cultural connections

Your teaching approach:
- Ask Socratic questions to encourage critical thinking
- Provide clear explanations of difficult concepts
- Make connections between ideas and across time periods
- Encourage students to think deeply about timeless questions
- Use accessible language while maintaining scholarly accuracy
- Inspire curiosity and love of learning

Always be encouraging, patient, and supportive while maintaining academic rigor."#;

/// Optional reading context attached to a question.
#[derive(Debug, Clone, Default)]
pub struct QuestionContext {
    pub book_title: Option<String>,
    pub book_author: Option<String>,
    pub passage_text: Option<String>,
    /// Passed through for downstream logging/persistence by the caller.
    pub user_id: Option<String>,
}

/// Orchestrator owning one selected provider for its whole lifetime.
pub struct Sage {
    service: Box<dyn AIService>,
    system_prompt: String,
}

impl Sage {
    /// Select and construct the provider, then wrap it.
    pub fn new(kind: ProviderKind, config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self::with_service(ai::build_service(kind, config)?))
    }

    /// Wrap an already-built service. This is the injection point for
    /// tests and custom wiring.
    pub fn with_service(service: Box<dyn AIService>) -> Self {
        Self {
            service,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Ask one question with optional book context.
    ///
    /// Response time is measured here rather than trusted from the
    /// provider; self-hosted backends report timings unevenly or not at
    /// all.
    pub async fn ask(
        &self,
        question: &str,
        context: &QuestionContext,
    ) -> Result<AskResponse, SageError> {
        if question.chars().count() > MAX_QUESTION_CHARS {
            return Err(SageError::InvalidQuestion(format!(
                "question too long (max {MAX_QUESTION_CHARS} characters)"
            )));
        }

        let req = AskRequest {
            question: build_sage_prompt(question, context),
            book_title: context.book_title.clone(),
            book_author: context.book_author.clone(),
            passage_text: context.passage_text.clone(),
            context: self.system_prompt.clone(),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            user_id: context.user_id.clone(),
        };

        debug!(provider = %self.service.provider_info().provider, "asking the sage");
        let started = Instant::now();
        let mut response = self.service.ask(&req).await.map_err(SageError::Request)?;
        response.response_time = started.elapsed();
        Ok(response)
    }

    /// Capabilities of the underlying provider. No network access.
    pub fn capabilities(&self) -> Capabilities {
        self.service.capabilities()
    }

    /// Metadata of the underlying provider. No network access.
    pub fn provider_info(&self) -> ProviderInfo {
        self.service.provider_info()
    }

    /// Probe the underlying provider.
    pub async fn health_check(&self) -> Result<(), ProviderError> {
        self.service.health_check().await
    }
}

/// Deterministic prompt assembly: context sentence, then quoted passage,
/// then question, then the fixed instruction list.
fn build_sage_prompt(question: &str, ctx: &QuestionContext) -> String {
    let mut prompt = String::new();

    if let (Some(title), Some(author)) = (&ctx.book_title, &ctx.book_author) {
        if !title.is_empty() && !author.is_empty() {
            prompt.push_str(&format!(
                "Context: The user is reading \"{title}\" by {author}.\n\n"
            ));
        }
    }

    if let Some(passage) = &ctx.passage_text {
        if !passage.is_empty() {
            prompt.push_str(&format!("Relevant passage:\n\"{passage}\"\n\n"));
        }
    }

    prompt.push_str(&format!("Question: {question}\n\n"));

    prompt.push_str("Please provide an educational response that:\n");
    prompt.push_str("1. Directly addresses the question\n");
    prompt.push_str("2. Provides relevant classical context and historical background\n");
    prompt.push_str("3. Makes connections to other classical works when appropriate\n");
    prompt.push_str("4. Explains key concepts in an accessible way\n");
    prompt.push_str("5. Encourages deeper thinking about the material\n");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records the last request and answers with a canned response.
    #[derive(Clone, Debug)]
    struct RecordingService {
        last: Arc<Mutex<Option<AskRequest>>>,
        fail: bool,
    }

    impl RecordingService {
        fn new(fail: bool) -> Self {
            Self {
                last: Arc::new(Mutex::new(None)),
                fail,
            }
        }
    }

    #[async_trait]
    impl AIService for RecordingService {
        async fn ask(&self, req: &AskRequest) -> Result<AskResponse, ProviderError> {
            *self.last.lock().unwrap() = Some(req.clone());
            if self.fail {
                return Err(ProviderError::Empty {
                    endpoint: "mock".to_string(),
                });
            }
            Ok(AskResponse {
                answer: "An answer".to_string(),
                response_time: Duration::ZERO,
                tokens_used: 7,
                model: "mock-model".to_string(),
                provider: ProviderKind::Local,
                confidence: None,
                sources: Vec::new(),
            })
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities {
                supports_streaming: false,
                supports_conversations: true,
                supported_languages: vec!["en".to_string()],
                max_tokens: 100,
                max_context_length: 2048,
                supports_documents: false,
                supports_images: false,
            }
        }

        fn provider_info(&self) -> ProviderInfo {
            ProviderInfo {
                name: "Mock".to_string(),
                provider: ProviderKind::Local,
                model: "mock-model".to_string(),
                version: "1.0".to_string(),
                description: "mock".to_string(),
                is_local: true,
                cost: "free".to_string(),
            }
        }

        async fn health_check(&self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn republic_context() -> QuestionContext {
        QuestionContext {
            book_title: Some("The Republic".to_string()),
            book_author: Some("Plato".to_string()),
            passage_text: Some(
                "Then if there are any such things as absolute essences...".to_string(),
            ),
            user_id: None,
        }
    }

    #[test]
    fn test_prompt_sections_appear_in_order() {
        let prompt = build_sage_prompt("What is the theory of Forms?", &republic_context());

        let context_pos = prompt
            .find("Context: The user is reading \"The Republic\" by Plato.")
            .unwrap();
        let passage_pos = prompt
            .find("Relevant passage:\n\"Then if there are any such things as absolute essences...\"")
            .unwrap();
        let question_pos = prompt.find("Question: What is the theory of Forms?").unwrap();
        let instructions_pos = prompt.find("Please provide an educational response").unwrap();

        assert!(context_pos < passage_pos);
        assert!(passage_pos < question_pos);
        assert!(question_pos < instructions_pos);

        for point in [
            "1. Directly addresses the question",
            "2. Provides relevant classical context",
            "3. Makes connections to other classical works",
            "4. Explains key concepts in an accessible way",
            "5. Encourages deeper thinking",
        ] {
            assert!(prompt.contains(point), "missing instruction: {point}");
        }
    }

    #[test]
    fn test_prompt_omits_absent_context() {
        let prompt = build_sage_prompt("Why?", &QuestionContext::default());
        assert!(!prompt.contains("Context: The user is reading"));
        assert!(!prompt.contains("Relevant passage:"));
        assert!(prompt.starts_with("Question: Why?"));
    }

    #[test]
    fn test_prompt_needs_both_title_and_author() {
        let ctx = QuestionContext {
            book_title: Some("The Republic".to_string()),
            ..QuestionContext::default()
        };
        let prompt = build_sage_prompt("Why?", &ctx);
        assert!(!prompt.contains("Context: The user is reading"));
    }

    #[tokio::test]
    async fn test_ask_carries_system_prompt_and_defaults() {
        let service = RecordingService::new(false);
        let sage = Sage::with_service(Box::new(service.clone()));

        sage.ask("What is virtue?", &QuestionContext::default())
            .await
            .unwrap();

        let req = service.last.lock().unwrap().take().unwrap();
        assert_eq!(req.context, SYSTEM_PROMPT);
        assert_eq!(req.temperature, Some(0.7));
        assert_eq!(req.max_tokens, Some(1000));
        assert!(req.question.contains("Question: What is virtue?"));
    }

    #[tokio::test]
    async fn test_provider_errors_are_wrapped_unchanged() {
        let sage = Sage::with_service(Box::new(RecordingService::new(true)));

        let err = sage
            .ask("Anything", &QuestionContext::default())
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("AI service request failed:"));
        assert!(text.contains("no choices in response"));
        assert!(matches!(err, SageError::Request(ProviderError::Empty { .. })));
    }

    #[tokio::test]
    async fn test_overlong_question_is_rejected_before_any_call() {
        let service = RecordingService::new(false);
        let sage = Sage::with_service(Box::new(service.clone()));

        let question = "x".repeat(MAX_QUESTION_CHARS + 1);
        let err = sage.ask(&question, &QuestionContext::default()).await.unwrap_err();
        assert!(matches!(err, SageError::InvalidQuestion(_)));
        assert!(service.last.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_metadata_passthrough() {
        let sage = Sage::with_service(Box::new(RecordingService::new(false)));
        assert_eq!(sage.provider_info().name, "Mock");
        assert_eq!(sage.capabilities().max_context_length, 2048);
        sage.health_check().await.unwrap();
    }
}
