//! Provider configuration for the LLM client.

use serde::{Deserialize, Serialize};

use crate::errors::PlanflowError;

/// Default per-invocation deadline in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Configuration for a completion provider.
///
/// Validated once at process start; the engine treats the values as
/// already checked afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider label, for logging only.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Bearer token for the provider endpoint.
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the provider API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model name to request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-invocation deadline in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Output token cap; provider default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_ms: default_timeout_ms(),
            max_output_tokens: None,
        }
    }
}

impl LlmConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from `PLANFLOW_*` environment variables.
    ///
    /// Recognized: `PLANFLOW_PROVIDER`, `PLANFLOW_API_KEY`,
    /// `PLANFLOW_BASE_URL`, `PLANFLOW_MODEL`, `PLANFLOW_TIMEOUT_MS`,
    /// `PLANFLOW_MAX_OUTPUT_TOKENS`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("PLANFLOW_PROVIDER") {
            config.provider = v;
        }
        if let Ok(v) = std::env::var("PLANFLOW_API_KEY") {
            config.api_key = v;
        }
        if let Ok(v) = std::env::var("PLANFLOW_BASE_URL") {
            config.base_url = v;
        }
        if let Ok(v) = std::env::var("PLANFLOW_MODEL") {
            config.model = v;
        }
        if let Some(v) = std::env::var("PLANFLOW_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout_ms = v;
        }
        if let Some(v) = std::env::var("PLANFLOW_MAX_OUTPUT_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_output_tokens = Some(v);
        }
        config
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the per-invocation deadline.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the output token cap.
    #[must_use]
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    /// Checks the configuration is usable. Run once at startup.
    pub fn validate(&self) -> Result<(), PlanflowError> {
        if self.base_url.is_empty() {
            return Err(PlanflowError::Config("base_url is empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(PlanflowError::Config(format!(
                "base_url '{}' is not an http(s) URL",
                self.base_url
            )));
        }
        if self.model.is_empty() {
            return Err(PlanflowError::Config("model is empty".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(PlanflowError::Config("timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LlmConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = LlmConfig::new()
            .with_api_key("sk-test")
            .with_base_url("http://localhost:8080/v1")
            .with_model("test-model")
            .with_timeout_ms(1_000)
            .with_max_output_tokens(256);

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "test-model");
        assert_eq!(config.timeout_ms, 1_000);
        assert_eq!(config.max_output_tokens, Some(256));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = LlmConfig::new().with_base_url("ftp://example.com");
        assert!(config.validate().is_err());

        let config = LlmConfig::new().with_base_url("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = LlmConfig::new().with_timeout_ms(0);
        assert!(config.validate().is_err());
    }
}
