//! Response Synthesizer - turns an execution result into the final answer.
//!
//! The text generator is tried first. Any failure (disabled, unreachable,
//! timeout, empty body) drops to the deterministic template library, so the
//! answer is never empty and never an error.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::executor::ExecutionResult;
use crate::llm_client::{LlmError, TextGenerator};
use crate::templates::TemplateLibrary;

/// Where the final answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Generated,
    Fallback,
}

pub struct ResponseSynthesizer {
    generator: Arc<dyn TextGenerator>,
    templates: TemplateLibrary,
}

impl ResponseSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>, templates: TemplateLibrary) -> Self {
        Self {
            generator,
            templates,
        }
    }

    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    pub fn generator(&self) -> &dyn TextGenerator {
        self.generator.as_ref()
    }

    /// Free-text insight over everything retrieved so far
    pub fn generate_insights(
        &self,
        result: &ExecutionResult,
        question: &str,
    ) -> Result<String, LlmError> {
        let prompt = self.templates.insight_prompt(&result.data_text(), question);
        self.generator
            .complete(self.templates.insight_system_prompt(), &prompt)
    }

    pub fn synthesize(&self, user_text: &str, result: &ExecutionResult, confidence: f32) -> String {
        self.synthesize_with_source(user_text, result, confidence).0
    }

    pub fn synthesize_with_source(
        &self,
        user_text: &str,
        result: &ExecutionResult,
        confidence: f32,
    ) -> (String, ResponseSource) {
        let prompt =
            self.templates
                .synthesis_prompt(user_text, &result.data_text(), &result.insights);

        match self
            .generator
            .complete(self.templates.synthesis_system_prompt(), &prompt)
        {
            Ok(text) if !text.trim().is_empty() => {
                debug!(len = text.len(), "response generated");
                (text, ResponseSource::Generated)
            }
            Ok(_) => {
                warn!("generator returned blank text, using fallback");
                (self.fallback(user_text, result, confidence), ResponseSource::Fallback)
            }
            Err(e) => {
                match e {
                    LlmError::Disabled => debug!("text generation disabled, using fallback"),
                    _ => warn!(code = e.code(), "text generation failed, using fallback: {}", e),
                }
                (self.fallback(user_text, result, confidence), ResponseSource::Fallback)
            }
        }
    }

    /// Deterministic template answer; never empty
    pub fn fallback(&self, user_text: &str, result: &ExecutionResult, confidence: f32) -> String {
        let text = self.templates.fallback(user_text, result, confidence);
        if text.trim().is_empty() {
            self.templates.generic_response().to_string()
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;
    use crate::llm_client::{FakeLlmClient, OfflineClient};
    use serde_json::json;

    fn synth(generator: Arc<dyn TextGenerator>) -> ResponseSynthesizer {
        ResponseSynthesizer::new(generator, TemplateLibrary::new(Language::Portuguese))
    }

    #[test]
    fn test_generated_response_is_used() {
        let fake = Arc::new(FakeLlmClient::always("Resposta completa."));
        let s = synth(fake.clone());
        let mut result = ExecutionResult::default();
        result.raw_data.insert("summary".into(), json!({"total_records": 10}));
        result.insights.push("insight A".into());

        let (text, source) = s.synthesize_with_source("Qual o PIB?", &result, 0.9);
        assert_eq!(text, "Resposta completa.");
        assert_eq!(source, ResponseSource::Generated);

        let (system, user) = &fake.prompts()[0];
        assert_eq!(system, s.templates().synthesis_system_prompt());
        assert!(user.contains("Qual o PIB?"));
        assert!(user.contains("total_records"));
        assert!(user.contains("insight A"));
    }

    #[test]
    fn test_error_falls_back() {
        let s = synth(Arc::new(FakeLlmClient::always_error(LlmError::HttpError("502".into()))));
        let (text, source) = s.synthesize_with_source("olá", &ExecutionResult::default(), 0.8);
        assert_eq!(source, ResponseSource::Fallback);
        assert!(!text.trim().is_empty());
    }

    #[test]
    fn test_blank_generation_falls_back() {
        let s = synth(Arc::new(FakeLlmClient::always("   ")));
        let (text, source) = s.synthesize_with_source("xyz", &ExecutionResult::default(), 0.3);
        assert_eq!(source, ResponseSource::Fallback);
        assert!(!text.trim().is_empty());
    }

    #[test]
    fn test_offline_matches_failing_backend() {
        let offline = synth(Arc::new(OfflineClient));
        let failing = synth(Arc::new(FakeLlmClient::always_error(LlmError::Timeout(30))));
        let result = ExecutionResult::default();
        assert_eq!(
            offline.synthesize("Quais as maiores cidades?", &result, 0.9),
            failing.synthesize("Quais as maiores cidades?", &result, 0.9)
        );
    }
}
