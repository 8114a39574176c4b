//! Generation outputs and the external result envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::StageKind;
use crate::errors::{ErrorKind, PlanflowError};

/// A successful stage generation with call metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput {
    /// The stage that was generated.
    pub stage: StageKind,
    /// The validated structured value.
    pub data: serde_json::Value,
    /// Total invocation attempts, including the successful one.
    pub attempts: usize,
    /// Wall-clock time across all attempts in milliseconds.
    pub elapsed_ms: u64,
    /// Estimated tokens in the system prompt plus context.
    pub prompt_tokens_estimate: usize,
    /// Estimated tokens in the accepted completion.
    pub response_tokens_estimate: usize,
    /// When the stage generation completed.
    pub completed_at: DateTime<Utc>,
}

/// Serializable envelope for callers outside the crate:
/// `{success: true, data} | {success: false, error_kind, message}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Whether the generation succeeded.
    pub success: bool,
    /// The structured value, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// The classified failure kind, on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// A user-presentable failure message, on failure. Never the raw
    /// model text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GenerationResult {
    /// Creates a success envelope.
    #[must_use]
    pub fn ok(output: &GenerationOutput) -> Self {
        Self {
            success: true,
            data: Some(output.data.clone()),
            error_kind: None,
            message: None,
        }
    }

    /// Creates a failure envelope from a classified error.
    #[must_use]
    pub fn fail(error: &PlanflowError) -> Self {
        Self {
            success: false,
            data: None,
            error_kind: Some(error.kind()),
            message: Some(format!("Stage generation failed: {}", error.kind())),
        }
    }
}

impl From<Result<GenerationOutput, PlanflowError>> for GenerationResult {
    fn from(result: Result<GenerationOutput, PlanflowError>) -> Self {
        match result {
            Ok(output) => Self::ok(&output),
            Err(error) => Self::fail(&error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LlmError;
    use serde_json::json;

    fn sample_output() -> GenerationOutput {
        GenerationOutput {
            stage: StageKind::RiskAnalysis,
            data: json!({"risks": [], "approaches": []}),
            attempts: 1,
            elapsed_ms: 42,
            prompt_tokens_estimate: 120,
            response_tokens_estimate: 16,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_success_envelope() {
        let envelope = GenerationResult::ok(&sample_output());
        assert!(envelope.success);
        assert!(envelope.data.is_some());
        assert!(envelope.error_kind.is_none());

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], json!(true));
        assert!(json.get("error_kind").is_none());
    }

    #[test]
    fn test_failure_envelope() {
        let error: PlanflowError = LlmError::timeout(1_000).into();
        let envelope = GenerationResult::fail(&error);

        assert!(!envelope.success);
        assert_eq!(envelope.error_kind, Some(ErrorKind::Timeout));
        assert!(envelope.data.is_none());

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["error_kind"], json!("timeout"));
    }

    #[test]
    fn test_failure_message_never_contains_raw_text() {
        let error: PlanflowError =
            crate::errors::ExtractError::no_structured_value("SECRET raw model text").into();
        let envelope = GenerationResult::fail(&error);
        assert!(!envelope.message.unwrap().contains("SECRET"));
    }

    #[test]
    fn test_from_result_conversion() {
        let ok: GenerationResult = Ok(sample_output()).into();
        assert!(ok.success);

        let err: GenerationResult =
            Err(PlanflowError::from(LlmError::EmptyResponse)).into();
        assert_eq!(err.error_kind, Some(ErrorKind::EmptyResponse));
    }
}
