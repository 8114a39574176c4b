//! The stage runner: one bounded generation pass per call.

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use super::result::GenerationOutput;
use super::retry::RetryPolicy;
use crate::core::{StageKind, WorkflowState};
use crate::errors::{ExtractError, PlanflowError, StageNotActiveError};
use crate::extract::{self, ContractRegistry};
use crate::llm::{InvokeOptions, LlmClient};
use crate::prompts::PromptRegistry;
use crate::utils::estimate_tokens;

/// Composes the stage engine, prompt registry, LLM client, and
/// extractor for one workflow.
///
/// The orchestrator owns every retry decision; the client and the
/// extractor never retry on their own. Callers must serialize
/// `run_stage` calls against the same `WorkflowState`: the design
/// assumes at most one in-flight generation per workflow instance.
pub struct WorkflowOrchestrator {
    client: Arc<dyn LlmClient>,
    prompts: PromptRegistry,
    contracts: ContractRegistry,
    policy: RetryPolicy,
    options: InvokeOptions,
}

impl WorkflowOrchestrator {
    /// Creates an orchestrator with default registries, policy, and
    /// invocation options.
    #[must_use]
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            prompts: PromptRegistry::with_defaults(),
            contracts: ContractRegistry::with_defaults(),
            policy: RetryPolicy::default(),
            options: InvokeOptions::default(),
        }
    }

    /// Replaces the prompt registry.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptRegistry) -> Self {
        self.prompts = prompts;
        self
    }

    /// Replaces the contract registry.
    #[must_use]
    pub fn with_contracts(mut self, contracts: ContractRegistry) -> Self {
        self.contracts = contracts;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the invocation options.
    #[must_use]
    pub fn with_options(mut self, options: InvokeOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the generation step for a stage.
    ///
    /// Verifies the stage is active, resolves the prompt and contract,
    /// invokes the client through the bounded retry loop, and on
    /// success marks the stage completed (unlocking the next one). On
    /// any failure the stage stays active so the caller can retry
    /// without losing workflow position.
    pub async fn run_stage(
        &self,
        state: &mut WorkflowState,
        kind: StageKind,
        payload: &Value,
    ) -> Result<GenerationOutput, PlanflowError> {
        if state.active_kind() != Some(kind) {
            return Err(StageNotActiveError::new(kind, state.active_kind()).into());
        }

        let prompt = self.prompts.resolve(kind)?;
        let contract = self.contracts.resolve(kind)?;
        let base_context = build_context(kind, payload)?;

        let started = Instant::now();
        let mut attempts = 0usize;
        let mut transient_retries = 0usize;
        let mut parse_retries = 0usize;
        let mut hints: Vec<String> = Vec::new();

        loop {
            attempts += 1;
            let context = assemble_context(&base_context, &hints);

            let reply = match self.client.invoke(prompt, &context, &self.options).await {
                Ok(text) => text,
                Err(error)
                    if error.is_transient()
                        && transient_retries < self.policy.max_transient_retries =>
                {
                    transient_retries += 1;
                    let delay = self.policy.delay_for(transient_retries);
                    tracing::warn!(
                        stage = %kind,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "transient provider failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(error) => {
                    tracing::warn!(stage = %kind, attempts, error = %error, "stage generation failed");
                    return Err(error.into());
                }
            };

            match extract::parse(&reply, contract) {
                Ok(data) => {
                    state.mark_completed(kind)?;
                    let output = GenerationOutput {
                        stage: kind,
                        data,
                        attempts,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                        prompt_tokens_estimate: estimate_tokens(prompt)
                            + estimate_tokens(&context),
                        response_tokens_estimate: estimate_tokens(&reply),
                        completed_at: Utc::now(),
                    };
                    tracing::info!(
                        stage = %kind,
                        attempts,
                        elapsed_ms = output.elapsed_ms,
                        "stage generation complete"
                    );
                    return Ok(output);
                }
                Err(error) if parse_retries < self.policy.max_parse_retries => {
                    parse_retries += 1;
                    tracing::warn!(
                        stage = %kind,
                        attempt = attempts,
                        error = %error,
                        "model output failed validation, retrying with corrective instruction"
                    );
                    hints.push(corrective_hint(&error));
                }
                Err(error) => {
                    tracing::warn!(stage = %kind, attempts, error = %error, "stage generation failed");
                    return Err(error.into());
                }
            }
        }
    }
}

/// Serializes the payload with the generic formatting instructions into
/// the context message. Stage-specific guidance lives in the system
/// prompt template.
fn build_context(kind: StageKind, payload: &Value) -> Result<String, PlanflowError> {
    let payload_json = serde_json::to_string_pretty(payload)
        .map_err(|e| PlanflowError::Serialization(e.to_string()))?;
    Ok(format!(
        "## Stage\n{kind}\n\n## Input\n{payload_json}\n\n## Response Format\nRespond with a single JSON object matching the required shape for this stage. No prose, no code fences."
    ))
}

/// Appends accumulated corrective hints to the base context.
fn assemble_context(base_context: &str, hints: &[String]) -> String {
    if hints.is_empty() {
        return base_context.to_string();
    }
    format!("{base_context}\n\n{}", hints.join("\n\n"))
}

fn corrective_hint(error: &ExtractError) -> String {
    format!(
        "## Correction\nYour previous attempt was invalid: {error}. Return only a single valid JSON object with the required fields. No prose, no code fences."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_context_embeds_stage_and_payload() {
        let context = build_context(StageKind::RiskAnalysis, &json!({"goal": "ship"})).unwrap();
        assert!(context.contains("risk_analysis"));
        assert!(context.contains("\"goal\": \"ship\""));
    }

    #[test]
    fn test_assemble_context_without_hints_is_base() {
        assert_eq!(assemble_context("base", &[]), "base");
    }

    #[test]
    fn test_assemble_context_appends_hints_in_order() {
        let hints = vec!["first hint".to_string(), "second hint".to_string()];
        let context = assemble_context("base", &hints);
        let first = context.find("first hint").unwrap();
        let second = context.find("second hint").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_corrective_hint_names_the_failure() {
        let error = ExtractError::shape_mismatch("severity", "is 'extreme'", "raw");
        let hint = corrective_hint(&error);
        assert!(hint.contains("severity"));
        assert!(hint.contains("previous attempt was invalid"));
    }
}
