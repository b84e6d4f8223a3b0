//! Text generation client abstraction.
//!
//! The agent only needs "system prompt + user prompt in, text out". The HTTP
//! client speaks the OpenAI-compatible chat-completions protocol; the fake and
//! offline clients stand in for it in tests and when no backend is configured.

use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::ConfigError;

/// Text generation errors. All of them are recoverable for the agent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("text generation is disabled")]
    Disabled,

    #[error("no API key configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("backend returned empty response")]
    EmptyResponse,
}

impl LlmError {
    pub fn code(&self) -> &'static str {
        match self {
            LlmError::Disabled => "llm_disabled",
            LlmError::MissingApiKey => "llm_missing_api_key",
            LlmError::HttpError(_) => "llm_http",
            LlmError::InvalidJson(_) => "llm_invalid_json",
            LlmError::Timeout(_) => "llm_timeout",
            LlmError::EmptyResponse => "llm_empty",
        }
    }
}

/// Anything that can turn a prompt into text
pub trait TextGenerator: Send + Sync {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;

    /// Cheap connectivity check
    fn probe(&self) -> Result<(), LlmError> {
        self.complete("Reply with OK.", "ping").map(|_| ())
    }
}

/// OpenAI-compatible chat-completions client
pub struct HttpLlmClient {
    config: LlmConfig,
    client: reqwest::blocking::Client,
}

impl HttpLlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, ConfigError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn send(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        timeout_secs: u64,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        if !self.config.enabled {
            return Err(LlmError::Disabled);
        }
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        let request_body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "temperature": 0.7,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .timeout(Duration::from_secs(timeout_secs))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(timeout_secs)
                } else {
                    LlmError::HttpError(format!("request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(LlmError::HttpError(format!("HTTP {}", response.status())));
        }

        let response_json: serde_json::Value = response
            .json()
            .map_err(|e| LlmError::InvalidJson(format!("failed to parse response: {}", e)))?;

        extract_content(&response_json)
    }
}

impl TextGenerator for HttpLlmClient {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        tracing::debug!(model = %self.config.model, prompt_len = user_prompt.len(), "text generation request");
        let result = self.send(system_prompt, user_prompt, self.config.timeout_secs, 1000);
        if let Err(ref e) = result {
            tracing::warn!(code = e.code(), "text generation failed: {}", e);
        }
        result
    }

    fn probe(&self) -> Result<(), LlmError> {
        self.send(
            "You are a connectivity check. Reply with OK.",
            "ping",
            self.config.probe_timeout_secs,
            5,
        )
        .map(|_| ())
    }
}

/// Pull `choices[0].message.content` out of a chat-completions response
fn extract_content(response: &serde_json::Value) -> Result<String, LlmError> {
    let text = response
        .get("choices")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("message"))
        .and_then(|v| v.get("content"))
        .and_then(|v| v.as_str())
        .ok_or(LlmError::EmptyResponse)?;

    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text.to_string())
}

/// Generator used when no backend is configured: always `Disabled`
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineClient;

impl TextGenerator for OfflineClient {
    fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Disabled)
    }
}

/// Scripted generator for tests.
///
/// Responses are consumed in order; the last one repeats forever.
pub struct FakeLlmClient {
    responses: Mutex<Vec<Result<String, LlmError>>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl FakeLlmClient {
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn always_error(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_else(|e| e.into_inner().len())
    }

    /// Every `(system, user)` pair received so far
    pub fn prompts(&self) -> Vec<(String, String)> {
        match self.prompts.lock() {
            Ok(p) => p.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }
}

impl TextGenerator for FakeLlmClient {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((system_prompt.to_string(), user_prompt.to_string()));

        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        match responses.len() {
            0 => Err(LlmError::EmptyResponse),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}
