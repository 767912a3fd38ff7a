//! LLM Client: the single point of entry for all chat-completion calls.
//!
//! ARCHITECTURAL RULE: No other module may call a provider directly.
//! All LLM interactions MUST go through this module.
//!
//! Provider failures never escape as errors: `call` always returns an
//! `LlmCallResult` and the orchestrators decide which fallback tier applies.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{LlmConfig, ProviderCredential};

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request exceeded the configured ceiling")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// The three pipeline tasks. Each carries its own system prompt and sampling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmTask {
    QuestionGeneration,
    AnswerEvaluation,
    AtsMatching,
}

impl LlmTask {
    pub fn system_prompt(&self) -> &'static str {
        match self {
            LlmTask::QuestionGeneration => prompts::QUESTION_GENERATION_SYSTEM,
            LlmTask::AnswerEvaluation => prompts::ANSWER_EVALUATION_SYSTEM,
            LlmTask::AtsMatching => prompts::ATS_MATCHING_SYSTEM,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LlmTask::QuestionGeneration => "question_generation",
            LlmTask::AnswerEvaluation => "answer_evaluation",
            LlmTask::AtsMatching => "ats_matching",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Per-task sampling table. Scoring tasks run cooler than phrasing tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTable {
    pub question_generation: TaskSettings,
    pub answer_evaluation: TaskSettings,
    pub ats_matching: TaskSettings,
}

impl Default for TaskTable {
    fn default() -> Self {
        Self {
            question_generation: TaskSettings {
                temperature: 0.7,
                max_tokens: 1500,
            },
            answer_evaluation: TaskSettings {
                temperature: 0.5,
                max_tokens: 1000,
            },
            ats_matching: TaskSettings {
                temperature: 0.3,
                max_tokens: 1500,
            },
        }
    }
}

impl TaskTable {
    pub fn settings(&self, task: LlmTask) -> TaskSettings {
        match task {
            LlmTask::QuestionGeneration => self.question_generation,
            LlmTask::AnswerEvaluation => self.answer_evaluation,
            LlmTask::AtsMatching => self.ats_matching,
        }
    }
}

/// Outcome of one LLM round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmCallResult {
    Success(String),
    /// No credential configured. No network I/O was attempted.
    NoCredentials,
    ProviderFailure(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: String,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if it has any non-blank content.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// The single LLM client used by all orchestrators.
/// Wraps an OpenAI-compatible chat-completions endpoint. One request per call, no retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn has_credentials(&self) -> bool {
        self.config.credential().is_some()
    }

    /// Model id recorded alongside generated content.
    pub fn model(&self) -> String {
        self.config.resolved_model()
    }

    /// Sends `prompt` under the task's system prompt and sampling settings.
    pub async fn call(&self, task: LlmTask, prompt: &str) -> LlmCallResult {
        let Some(credential) = self.config.credential() else {
            debug!("No LLM credentials configured; {} uses fallback", task.label());
            return LlmCallResult::NoCredentials;
        };

        match self.send(credential, task, prompt).await {
            Ok(text) => LlmCallResult::Success(text),
            Err(e) => {
                warn!(
                    "LLM call for {} via {} failed: {e}",
                    task.label(),
                    credential.provider.as_str()
                );
                LlmCallResult::ProviderFailure(e.to_string())
            }
        }
    }

    /// Chat body for one task: its system prompt, sampling settings, and the
    /// model id without any routing prefix.
    fn build_request<'a>(&self, task: LlmTask, prompt: &'a str) -> ChatRequest<'a> {
        let settings = self.config.tasks.settings(task);
        ChatRequest {
            model: wire_model(&self.config.resolved_model()).to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: task.system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    async fn send(
        &self,
        credential: &ProviderCredential,
        task: LlmTask,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let request_body = self.build_request(task, prompt);

        let response = self
            .client
            .post(completions_url(&credential.base_url))
            .bearer_auth(&credential.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await.map_err(classify_transport_error)?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                request_body.model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

fn classify_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Http(e)
    }
}

/// `openrouter/` is a routing prefix only; the provider expects the bare id.
fn wire_model(model: &str) -> &str {
    model.strip_prefix("openrouter/").unwrap_or(model)
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Provider;
    use std::time::Duration;

    #[test]
    fn test_task_table_defaults() {
        let table = TaskTable::default();
        assert_eq!(table.settings(LlmTask::QuestionGeneration).temperature, 0.7);
        assert_eq!(table.settings(LlmTask::QuestionGeneration).max_tokens, 1500);
        assert_eq!(table.settings(LlmTask::AnswerEvaluation).temperature, 0.5);
        assert_eq!(table.settings(LlmTask::AnswerEvaluation).max_tokens, 1000);
        assert_eq!(table.settings(LlmTask::AtsMatching).temperature, 0.3);
        assert_eq!(table.settings(LlmTask::AtsMatching).max_tokens, 1500);
    }

    #[test]
    fn test_system_prompts_are_task_specific() {
        assert!(LlmTask::QuestionGeneration
            .system_prompt()
            .contains("expert interview question generator"));
        assert!(LlmTask::AnswerEvaluation
            .system_prompt()
            .contains("expert interview evaluator"));
        assert!(LlmTask::AtsMatching
            .system_prompt()
            .contains("expert ATS matching system"));
    }

    #[test]
    fn test_wire_model_strips_routing_prefix() {
        assert_eq!(wire_model("openrouter/gpt-3.5-turbo"), "gpt-3.5-turbo");
        assert_eq!(wire_model("gpt-4o-mini"), "gpt-4o-mini");
    }

    #[test]
    fn test_completions_url_handles_trailing_slash() {
        assert_eq!(
            completions_url("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            completions_url("https://openrouter.ai/api/v1"),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_response_text_from_first_choice() {
        let json = r#"{
            "choices": [{"message": {"role": "assistant", "content": "[\"Why?\"]"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), Some("[\"Why?\"]"));
        assert_eq!(parsed.usage.unwrap().completion_tokens, 4);
    }

    #[test]
    fn test_chat_response_blank_content_is_none() {
        let json = r#"{"choices": [{"message": {"content": "   "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.text().is_none());

        let json = r#"{"choices": []}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.text().is_none());
    }

    #[test]
    fn test_request_body_carries_task_settings() {
        let mut config = LlmConfig::without_credentials();
        config.credential = Some(ProviderCredential::new(
            Provider::OpenRouter,
            "test-key",
            "https://openrouter.ai/api/v1",
        ));
        config.model_override = Some("gpt-4o-mini".to_string());
        let client = LlmClient::new(config).unwrap();

        let body = serde_json::to_value(client.build_request(LlmTask::AtsMatching, "match this"))
            .unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(
            body["messages"][0]["content"],
            prompts::ATS_MATCHING_SYSTEM
        );
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "match this");
        assert_eq!(body["max_tokens"], 1500);
        let temperature = body["temperature"].as_f64().unwrap();
        assert!((temperature - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_request_body_per_task_sampling() {
        let client = LlmClient::new(LlmConfig::without_credentials()).unwrap();
        let body =
            serde_json::to_value(client.build_request(LlmTask::AnswerEvaluation, "p")).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 1000);
        let temperature = body["temperature"].as_f64().unwrap();
        assert!((temperature - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_no_credentials_short_circuits() {
        let client = LlmClient::new(LlmConfig::without_credentials()).unwrap();
        assert!(!client.has_credentials());
        let result = client.call(LlmTask::AnswerEvaluation, "prompt").await;
        assert_eq!(result, LlmCallResult::NoCredentials);
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_a_provider_failure() {
        let mut config = LlmConfig::without_credentials();
        config.request_timeout = Duration::from_secs(2);
        config.credential = Some(ProviderCredential::new(
            Provider::Generic,
            "test-key",
            "http://127.0.0.1:9/v1",
        ));
        let client = LlmClient::new(config).unwrap();
        let result = client.call(LlmTask::QuestionGeneration, "prompt").await;
        assert!(matches!(result, LlmCallResult::ProviderFailure(_)));
    }
}
