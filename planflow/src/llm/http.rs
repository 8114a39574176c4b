//! HTTP chat-completion client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::client::{ensure_non_empty, InvokeOptions, LlmClient};
use super::config::LlmConfig;
use crate::errors::{LlmError, PlanflowError};

/// `LlmClient` implementation over an OpenAI-style chat-completion
/// endpoint.
///
/// One POST per invocation; the deadline covers connection, request,
/// and body read together.
#[derive(Debug, Clone)]
pub struct HttpLlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpLlmClient {
    /// Creates a client for a validated configuration.
    pub fn new(config: LlmConfig) -> Result<Self, PlanflowError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| PlanflowError::Config(format!("build http client: {e}")))?;
        Ok(Self { config, http })
    }

    /// The provider configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn request_completion(
        &self,
        system_prompt: &str,
        context: &str,
        options: &InvokeOptions,
    ) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: context,
                },
            ],
            max_tokens: options.max_output_tokens,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error(options.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::provider_unavailable(format!(
                "provider returned status {status}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(classify_transport_error(options.timeout_ms))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

fn classify_transport_error(timeout_ms: u64) -> impl Fn(reqwest::Error) -> LlmError {
    move |err| {
        if err.is_timeout() {
            LlmError::timeout(timeout_ms)
        } else {
            LlmError::provider_unavailable(err.to_string())
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn invoke(
        &self,
        system_prompt: &str,
        context: &str,
        options: &InvokeOptions,
    ) -> Result<String, LlmError> {
        let started = Instant::now();
        let deadline = Duration::from_millis(options.timeout_ms);

        let text = tokio::time::timeout(
            deadline,
            self.request_completion(system_prompt, context, options),
        )
        .await
        .map_err(|_| LlmError::timeout(options.timeout_ms))??;

        tracing::info!(
            provider = %self.config.provider,
            model = %self.config.model,
            latency_ms = started.elapsed().as_millis() as u64,
            prompt_chars = system_prompt.len() + context.len(),
            response_chars = text.len(),
            "llm invoke complete"
        );

        ensure_non_empty(text)
    }
}
