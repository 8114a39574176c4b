//! End-to-end orchestration scenarios against the mock client.

use std::sync::Arc;

use serde_json::json;

use crate::core::{StageKind, StageStatus, WorkflowState};
use crate::errors::{ErrorKind, LlmError, PlanflowError};
use crate::orchestrator::{GenerationResult, RetryPolicy, WorkflowOrchestrator};
use crate::testing::MockLlmClient;

const VALID_RISK_JSON: &str = r#"{
    "risks": [{"type": "technical", "description": "unproven stack", "severity": "medium"}],
    "approaches": [{"name": "prototype first", "description": "spike the risky part"}]
}"#;

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new().with_base_delay_ms(1).with_max_delay_ms(2)
}

fn orchestrator_with(mock: MockLlmClient) -> (WorkflowOrchestrator, Arc<MockLlmClient>) {
    let client = Arc::new(mock);
    let orchestrator =
        WorkflowOrchestrator::new(client.clone()).with_policy(fast_policy());
    (orchestrator, client)
}

/// Advances a fresh workflow so that `kind` is the active stage.
fn state_at(kind: StageKind) -> WorkflowState {
    let mut state = WorkflowState::initialize();
    for earlier in &StageKind::ALL[..kind.position()] {
        state.mark_completed(*earlier).unwrap();
    }
    state
}

#[tokio::test]
async fn test_valid_first_reply_completes_stage_and_unlocks_next() {
    let (orchestrator, client) = orchestrator_with(
        MockLlmClient::new().with_reply(format!("Here you go:\n```json\n{VALID_RISK_JSON}\n```")),
    );
    let mut state = state_at(StageKind::RiskAnalysis);

    let output = orchestrator
        .run_stage(&mut state, StageKind::RiskAnalysis, &json!({"core_goal": "ship"}))
        .await
        .unwrap();

    assert_eq!(output.stage, StageKind::RiskAnalysis);
    assert_eq!(output.attempts, 1);
    assert!(output.data["risks"][0]["id"].is_string());
    assert_eq!(output.data["approaches"][0]["recommended"], json!(false));
    assert!(output.prompt_tokens_estimate > 0);
    assert!(output.response_tokens_estimate > 0);

    assert_eq!(
        state.stage(StageKind::RiskAnalysis).status,
        StageStatus::Completed
    );
    assert_eq!(state.active_kind(), Some(StageKind::TechStack));
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_timeout_on_every_attempt_surfaces_and_leaves_stage_active() {
    let (orchestrator, client) = orchestrator_with(
        MockLlmClient::new().with_repeating_failure(LlmError::timeout(50)),
    );
    let mut state = state_at(StageKind::RiskAnalysis);

    let error = orchestrator
        .run_stage(&mut state, StageKind::RiskAnalysis, &json!({}))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Timeout);
    // Initial attempt plus the transient retry bound.
    assert_eq!(client.call_count(), 3);
    assert_eq!(
        state.stage(StageKind::RiskAnalysis).status,
        StageStatus::Active
    );
    assert_eq!(
        state.stage(StageKind::TechStack).status,
        StageStatus::Locked
    );
}

#[tokio::test]
async fn test_transient_failure_then_success() {
    let (orchestrator, client) = orchestrator_with(
        MockLlmClient::new()
            .with_failure(LlmError::provider_unavailable("connection reset"))
            .with_reply(VALID_RISK_JSON),
    );
    let mut state = state_at(StageKind::RiskAnalysis);

    let output = orchestrator
        .run_stage(&mut state, StageKind::RiskAnalysis, &json!({}))
        .await
        .unwrap();

    assert_eq!(output.attempts, 2);
    assert_eq!(client.call_count(), 2);
    assert_eq!(state.active_kind(), Some(StageKind::TechStack));
}

#[tokio::test]
async fn test_invalid_output_retried_with_corrective_instruction() {
    let (orchestrator, client) = orchestrator_with(
        MockLlmClient::new()
            .with_reply("I cannot help with that.")
            .with_reply(VALID_RISK_JSON),
    );
    let mut state = state_at(StageKind::RiskAnalysis);

    let output = orchestrator
        .run_stage(&mut state, StageKind::RiskAnalysis, &json!({}))
        .await
        .unwrap();

    assert_eq!(output.attempts, 2);
    let retry_context = client.last_context().unwrap();
    assert!(retry_context.contains("previous attempt was invalid"));
    assert_eq!(state.active_kind(), Some(StageKind::TechStack));
}

#[tokio::test]
async fn test_parse_retries_exhausted_surfaces_failure() {
    let (orchestrator, client) = orchestrator_with(
        MockLlmClient::new()
            .with_reply("no json here")
            .with_reply("still no json"),
    );
    let mut state = state_at(StageKind::RiskAnalysis);

    let error = orchestrator
        .run_stage(&mut state, StageKind::RiskAnalysis, &json!({}))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NoStructuredValueFound);
    // One corrective retry, then surfaced.
    assert_eq!(client.call_count(), 2);
    assert_eq!(
        state.stage(StageKind::RiskAnalysis).status,
        StageStatus::Active
    );
}

#[tokio::test]
async fn test_shape_mismatch_after_retry_names_field() {
    let bad = r#"{"risks":[{"type":"x","description":"y","severity":"extreme"}],"approaches":[]}"#;
    let (orchestrator, _client) = orchestrator_with(
        MockLlmClient::new().with_reply(bad).with_reply(bad),
    );
    let mut state = state_at(StageKind::RiskAnalysis);

    let error = orchestrator
        .run_stage(&mut state, StageKind::RiskAnalysis, &json!({}))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::ShapeMismatch);
    assert!(error.to_string().contains("severity"));
}

#[tokio::test]
async fn test_locked_stage_rejected_without_invoking_client() {
    let (orchestrator, client) = orchestrator_with(MockLlmClient::new());
    let mut state = WorkflowState::initialize();

    let error = orchestrator
        .run_stage(&mut state, StageKind::TechStack, &json!({}))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::StageNotActive);
    assert_eq!(client.call_count(), 0);
    assert_eq!(state.active_kind(), Some(StageKind::RequirementCollection));
}

#[tokio::test]
async fn test_completed_stage_cannot_be_regenerated() {
    let (orchestrator, client) = orchestrator_with(MockLlmClient::new());
    let mut state = state_at(StageKind::RiskAnalysis);

    // Requirement collection already completed; a redo is rejected.
    let error = orchestrator
        .run_stage(&mut state, StageKind::RequirementCollection, &json!({}))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::StageNotActive);
    assert_eq!(client.call_count(), 0);
    assert!(state.can_enter(StageKind::RequirementCollection));
}

#[tokio::test]
async fn test_full_workflow_runs_to_terminal_state() {
    let replies = [
        r#"{"project_name": "p", "core_goal": "g", "target_users": ["u"],
            "features": [{"name": "f", "description": "d"}]}"#,
        VALID_RISK_JSON,
        r#"{"recommendations": [{"category": "backend", "name": "n", "reason": "r"}]}"#,
        r#"{"mvp_features": [{"name": "auth"}], "future_features": [{"name": "billing"}],
            "dev_plan": ["step 1"]}"#,
        r#"{"diagram_type": "flow", "nodes": [{"label": "api"}], "edges": []}"#,
        r#"{"title": "Plan", "sections": [{"heading": "h", "content": "c"}]}"#,
    ];

    let mut mock = MockLlmClient::new();
    for reply in replies {
        mock = mock.with_reply(reply);
    }
    let (orchestrator, client) = orchestrator_with(mock);
    let mut state = WorkflowState::initialize();

    let mut payload = json!({});
    for kind in StageKind::ALL {
        let output = orchestrator
            .run_stage(&mut state, kind, &payload)
            .await
            .unwrap();
        // Feed each stage's output to the next, as a caller would.
        payload = output.data;
    }

    assert!(state.is_finished());
    assert_eq!(state.active_kind(), None);
    assert_eq!(
        state.current_stage().kind,
        StageKind::DocumentGeneration
    );
    assert_eq!(client.call_count(), 6);
}

#[tokio::test]
async fn test_envelope_round_trip_over_run_result() {
    let (orchestrator, _client) =
        orchestrator_with(MockLlmClient::new().with_reply(VALID_RISK_JSON));
    let mut state = state_at(StageKind::RiskAnalysis);

    let result = orchestrator
        .run_stage(&mut state, StageKind::RiskAnalysis, &json!({}))
        .await;
    let envelope = GenerationResult::from(result);

    assert!(envelope.success);
    let wire = serde_json::to_string(&envelope).unwrap();
    let parsed: GenerationResult = serde_json::from_str(&wire).unwrap();
    assert!(parsed.success);
    assert!(parsed.data.is_some());
}

#[tokio::test]
async fn test_failure_envelope_carries_classified_kind_only() {
    let (orchestrator, _client) = orchestrator_with(
        MockLlmClient::new().with_repeating_failure(LlmError::provider_unavailable("boom")),
    );
    let mut state = WorkflowState::initialize();

    let result: Result<_, PlanflowError> = orchestrator
        .run_stage(&mut state, StageKind::RequirementCollection, &json!({}))
        .await;
    let envelope = GenerationResult::from(result);

    assert!(!envelope.success);
    assert_eq!(envelope.error_kind, Some(ErrorKind::ProviderUnavailable));
    assert!(!envelope.message.unwrap().contains("boom"));
}
