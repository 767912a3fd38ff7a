use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::TaskTable;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat model used when `LITELLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded from environment variables.
/// Nothing here is required: a missing LLM key only switches the pipeline
/// to its deterministic fallbacks.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` is the only
    /// caller in production; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = match get("LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("LLM_TIMEOUT_SECS must be greater than zero");
        }

        // Priority order: OpenRouter, then OpenAI, then a generic endpoint.
        let credential = if let Some(key) = get("OPENROUTER_API_KEY") {
            Some(ProviderCredential::new(
                Provider::OpenRouter,
                key,
                OPENROUTER_BASE_URL,
            ))
        } else if let Some(key) = get("OPENAI_API_KEY") {
            Some(ProviderCredential::new(
                Provider::OpenAi,
                key,
                OPENAI_BASE_URL,
            ))
        } else {
            get("LITELLM_API_KEY").map(|key| {
                let base =
                    get("LITELLM_API_BASE").unwrap_or_else(|| OPENAI_BASE_URL.to_string());
                ProviderCredential::new(Provider::Generic, key, base)
            })
        };

        Ok(Config {
            llm: LlmConfig {
                credential,
                model_override: get("LITELLM_MODEL").map(|m| m.trim().to_string()),
                request_timeout: Duration::from_secs(timeout_secs),
                tasks: TaskTable::default(),
            },
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Which chat-completion provider a credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenRouter,
    OpenAi,
    /// LiteLLM-style key against any OpenAI-compatible endpoint.
    Generic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "openrouter",
            Provider::OpenAi => "openai",
            Provider::Generic => "generic",
        }
    }
}

#[derive(Clone)]
pub struct ProviderCredential {
    pub provider: Provider,
    pub api_key: String,
    pub base_url: String,
}

impl ProviderCredential {
    pub fn new(
        provider: Provider,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

// Keys never reach the logs.
impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Everything the LLM client needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Highest-priority key found in the environment, if any.
    pub credential: Option<ProviderCredential>,
    pub model_override: Option<String>,
    pub request_timeout: Duration,
    pub tasks: TaskTable,
}

impl LlmConfig {
    /// A config with no credentials. Every call takes the fallback path.
    pub fn without_credentials() -> Self {
        Self {
            credential: None,
            model_override: None,
            request_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            tasks: TaskTable::default(),
        }
    }

    pub fn credential(&self) -> Option<&ProviderCredential> {
        self.credential.as_ref()
    }

    /// Model id as recorded on generated questions. OpenRouter models carry an
    /// `openrouter/` routing prefix, added exactly once.
    pub fn resolved_model(&self) -> String {
        let model = self
            .model_override
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        match self.credential().map(|c| c.provider) {
            Some(Provider::OpenRouter) if !model.starts_with("openrouter/") => {
                format!("openrouter/{model}")
            }
            _ => model,
        }
    }
}
