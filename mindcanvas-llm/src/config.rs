//! Generation backend configuration
//!
//! The backend is chosen once at process start. API keys are only ever read
//! from the environment.

use crate::generator::PromptedGenerator;
use crate::providers::gemini::client::DEFAULT_GEMINI_MODEL;
use crate::providers::openai::client::DEFAULT_OPENAI_MODEL;
use crate::providers::{GeminiClient, OpenAIClient};
use crate::GenerationService;
use mindcanvas_core::{CanvasResult, ConfigError};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Default completion timeout in seconds.
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

/// Default client-side request budget per minute.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

// ============================================================================
// PROVIDER KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenAI,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAI => "openai",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => DEFAULT_GEMINI_MODEL,
            ProviderKind::OpenAI => DEFAULT_OPENAI_MODEL,
        }
    }

    fn model_var(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "MINDCANVAS_GEMINI_MODEL",
            ProviderKind::OpenAI => "MINDCANVAS_OPENAI_MODEL",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAI),
            other => Err(ConfigError::ProviderNotSupported {
                provider: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// GENERATION CONFIG
// ============================================================================

/// Everything needed to construct the process-wide generation service.
#[derive(Clone)]
pub struct GenerationConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    /// Override for the provider's API root (proxies, local mocks).
    pub base_url: Option<String>,
    pub requests_per_minute: u32,
    /// `None` disables the completion timeout.
    pub timeout: Option<Duration>,
}

impl GenerationConfig {
    /// Load from the process environment.
    ///
    /// Environment variables:
    /// - `MINDCANVAS_LLM_PROVIDER` (or `LLM_PROVIDER`): "gemini" (default) or "openai"
    /// - `GEMINI_API_KEY` / `OPENAI_API_KEY`: key for the selected provider (required)
    /// - `MINDCANVAS_GEMINI_MODEL` / `MINDCANVAS_OPENAI_MODEL`: model override
    /// - `MINDCANVAS_LLM_BASE_URL`: API root override
    /// - `MINDCANVAS_LLM_REQUESTS_PER_MINUTE`: client-side budget (default: 60)
    /// - `MINDCANVAS_GENERATION_TIMEOUT_SECS`: per-call timeout, 0 disables (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match lookup("MINDCANVAS_LLM_PROVIDER").or_else(|| lookup("LLM_PROVIDER")) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => ProviderKind::default(),
        };

        let api_key = lookup(provider.api_key_var())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                field: provider.api_key_var().to_string(),
            })?;

        let model = lookup(provider.model_var())
            .map(|model| model.trim().to_string())
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        let base_url = lookup("MINDCANVAS_LLM_BASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let requests_per_minute = match lookup("MINDCANVAS_LLM_REQUESTS_PER_MINUTE") {
            Some(raw) => parse_number::<u32>("MINDCANVAS_LLM_REQUESTS_PER_MINUTE", &raw)?,
            None => DEFAULT_REQUESTS_PER_MINUTE,
        };
        if requests_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MINDCANVAS_LLM_REQUESTS_PER_MINUTE".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let timeout_secs = match lookup("MINDCANVAS_GENERATION_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("MINDCANVAS_GENERATION_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_GENERATION_TIMEOUT_SECS,
        };

        Ok(Self {
            provider,
            api_key,
            model,
            base_url,
            requests_per_minute,
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        })
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("requests_per_minute", &self.requests_per_minute)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_number<T: FromStr>(field: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
        reason: "expected a non-negative integer".to_string(),
    })
}

/// Construct the generation service selected by `config`.
pub fn build_generation_service(config: &GenerationConfig) -> CanvasResult<Arc<dyn GenerationService>> {
    let service: Arc<dyn GenerationService> = match config.provider {
        ProviderKind::Gemini => {
            let mut client = GeminiClient::new(&config.api_key, &config.model, config.requests_per_minute);
            if let Some(url) = &config.base_url {
                client = client.with_base_url(url);
            }
            Arc::new(PromptedGenerator::new(client).with_timeout(config.timeout))
        }
        ProviderKind::OpenAI => {
            let mut client = OpenAIClient::new(&config.api_key, &config.model, config.requests_per_minute);
            if let Some(url) = &config.base_url {
                client = client.with_base_url(url);
            }
            Arc::new(PromptedGenerator::new(client).with_timeout(config.timeout))
        }
    };

    tracing::info!(
        provider = %config.provider,
        model = %config.model,
        "Generation service configured"
    );
    Ok(service)
}
