//! The LLM client trait and per-invocation options.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::config::{LlmConfig, DEFAULT_TIMEOUT_MS};
use crate::errors::LlmError;

/// Options for a single invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeOptions {
    /// Deadline for the whole call in milliseconds.
    pub timeout_ms: u64,
    /// Output token cap; provider default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_output_tokens: None,
        }
    }
}

impl InvokeOptions {
    /// Creates options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives options from a provider configuration.
    #[must_use]
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            timeout_ms: config.timeout_ms,
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// Sets the deadline.
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
}

/// A single synchronous-feeling request/response call to a remote
/// text-completion capability.
///
/// Implementations issue exactly one outbound call per `invoke` and
/// classify failures; they never retry internally, so total retry
/// behavior stays observable in the orchestrator.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Requests one completion for the given system prompt and context
    /// message.
    async fn invoke(
        &self,
        system_prompt: &str,
        context: &str,
        options: &InvokeOptions,
    ) -> Result<String, LlmError>;
}

/// Rejects empty or whitespace-only completions.
///
/// Shared by client implementations so the `EmptyResponse`
/// classification is uniform.
pub fn ensure_non_empty(text: String) -> Result<String, LlmError> {
    if text.trim().is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = InvokeOptions::default();
        assert_eq!(options.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(options.max_output_tokens, None);
    }

    #[test]
    fn test_options_from_config() {
        let config = LlmConfig::new().with_timeout_ms(1_500).with_max_output_tokens(64);
        let options = InvokeOptions::from_config(&config);
        assert_eq!(options.timeout_ms, 1_500);
        assert_eq!(options.max_output_tokens, Some(64));
    }

    #[test]
    fn test_ensure_non_empty() {
        assert!(ensure_non_empty("ok".to_string()).is_ok());
        assert!(matches!(
            ensure_non_empty("   \n\t ".to_string()),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            ensure_non_empty(String::new()),
            Err(LlmError::EmptyResponse)
        ));
    }
}
