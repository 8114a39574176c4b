//! Error types for the planflow workflow engine.
//!
//! This module provides the full error taxonomy: stage-machine misuse,
//! configuration gaps, transient provider failures, and model-output
//! quality failures, each with a stable [`ErrorKind`] identifier for
//! the external result envelope.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::core::{StageKind, StageStatus};
use crate::utils::truncate_snippet;

/// Maximum characters of raw model text carried in a parse failure.
///
/// Failures never carry the unbounded model output; diagnostics get a
/// bounded snippet instead.
pub const RAW_SNIPPET_MAX_CHARS: usize = 500;

/// The main error type for planflow operations.
#[derive(Debug, Error)]
pub enum PlanflowError {
    /// A stage transition was attempted that the state machine forbids.
    #[error("{0}")]
    Transition(#[from] InvalidTransitionError),

    /// A stage kind has no registered template or contract.
    #[error("{0}")]
    UnknownStage(#[from] UnknownStageError),

    /// A generation step was requested for a stage that is not active.
    #[error("{0}")]
    StageNotActive(#[from] StageNotActiveError),

    /// The LLM call failed.
    #[error("{0}")]
    Llm(#[from] LlmError),

    /// The model response could not be turned into a valid structured value.
    #[error("{0}")]
    Extract(#[from] ExtractError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration detected at startup.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlanflowError {
    /// Returns the stable classified kind for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transition(_) => ErrorKind::InvalidTransition,
            Self::UnknownStage(_) => ErrorKind::UnknownStage,
            Self::StageNotActive(_) => ErrorKind::StageNotActive,
            Self::Llm(LlmError::ProviderUnavailable { .. }) => ErrorKind::ProviderUnavailable,
            Self::Llm(LlmError::Timeout { .. }) => ErrorKind::Timeout,
            Self::Llm(LlmError::EmptyResponse) => ErrorKind::EmptyResponse,
            Self::Extract(ExtractError::NoStructuredValueFound { .. }) => {
                ErrorKind::NoStructuredValueFound
            }
            Self::Extract(ExtractError::ShapeMismatch { .. }) => ErrorKind::ShapeMismatch,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

/// Stable error identifiers exposed through the result envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Stage machine misuse; a programming error, never retried.
    InvalidTransition,
    /// Missing static configuration for a stage kind.
    UnknownStage,
    /// Generation requested against a non-active stage.
    StageNotActive,
    /// Transport or provider-side failure.
    ProviderUnavailable,
    /// The provider did not answer within the deadline.
    Timeout,
    /// The provider answered with an empty or whitespace-only body.
    EmptyResponse,
    /// No balanced structured value was found in the model output.
    NoStructuredValueFound,
    /// The structured value did not match the stage's shape contract.
    ShapeMismatch,
    /// A value could not be serialized or deserialized.
    Serialization,
    /// Invalid configuration.
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidTransition => "invalid_transition",
            Self::UnknownStage => "unknown_stage",
            Self::StageNotActive => "stage_not_active",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::Timeout => "timeout",
            Self::EmptyResponse => "empty_response",
            Self::NoStructuredValueFound => "no_structured_value_found",
            Self::ShapeMismatch => "shape_mismatch",
            Self::Serialization => "serialization",
            Self::Config => "config",
        };
        write!(f, "{name}")
    }
}

/// Error raised when completing a stage that is not active.
#[derive(Debug, Clone, Error)]
#[error("Invalid transition: stage '{stage}' is {status}, only the active stage can be completed")]
pub struct InvalidTransitionError {
    /// The stage the transition was attempted on.
    pub stage: StageKind,
    /// The stage's status at the time of the attempt.
    pub status: StageStatus,
}

impl InvalidTransitionError {
    /// Creates a new invalid transition error.
    #[must_use]
    pub fn new(stage: StageKind, status: StageStatus) -> Self {
        Self { stage, status }
    }
}

/// Error raised when a stage kind has no registered static configuration.
///
/// This indicates a startup wiring problem and should never occur once
/// the registries are validated.
#[derive(Debug, Clone, Error)]
#[error("Unknown stage: no {missing} registered for stage '{stage}'")]
pub struct UnknownStageError {
    /// The stage kind that failed to resolve.
    pub stage: StageKind,
    /// What was missing: "prompt template" or "shape contract".
    pub missing: &'static str,
}

impl UnknownStageError {
    /// Creates an error for a missing prompt template.
    #[must_use]
    pub fn prompt(stage: StageKind) -> Self {
        Self {
            stage,
            missing: "prompt template",
        }
    }

    /// Creates an error for a missing shape contract.
    #[must_use]
    pub fn contract(stage: StageKind) -> Self {
        Self {
            stage,
            missing: "shape contract",
        }
    }
}

/// Error raised when a generation step targets a non-active stage.
#[derive(Debug, Clone)]
pub struct StageNotActiveError {
    /// The stage generation was requested for.
    pub requested: StageKind,
    /// The currently active stage, if the workflow is not finished.
    pub active: Option<StageKind>,
}

impl StageNotActiveError {
    /// Creates a new stage-not-active error.
    #[must_use]
    pub fn new(requested: StageKind, active: Option<StageKind>) -> Self {
        Self { requested, active }
    }
}

impl fmt::Display for StageNotActiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.active {
            Some(active) => write!(
                f,
                "Stage '{}' is not active; the active stage is '{active}'",
                self.requested
            ),
            None => write!(
                f,
                "Stage '{}' is not active; the workflow is complete",
                self.requested
            ),
        }
    }
}

impl std::error::Error for StageNotActiveError {}

/// Errors from a single LLM invocation.
///
/// All variants are transient and eligible for bounded retry by the
/// orchestrator; the client itself never retries.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Transport or provider-side failure.
    #[error("Provider unavailable: {reason}")]
    ProviderUnavailable {
        /// What the transport reported.
        reason: String,
    },

    /// No response within the configured deadline.
    #[error("Model call timed out after {timeout_ms}ms")]
    Timeout {
        /// The deadline that was exceeded.
        timeout_ms: u64,
    },

    /// The provider returned an empty or whitespace-only completion.
    #[error("Model returned an empty response")]
    EmptyResponse,
}

impl LlmError {
    /// Creates a provider-unavailable error.
    #[must_use]
    pub fn provider_unavailable(reason: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub const fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    /// Whether the orchestrator may retry after this error.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable { .. } | Self::Timeout { .. } | Self::EmptyResponse
        )
    }
}

/// Errors from structured response extraction.
///
/// Both variants carry a bounded snippet of the raw model text for
/// diagnostics; the full text is never retained.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// No balanced structured value was found in the model output.
    #[error("No structured value found in model output")]
    NoStructuredValueFound {
        /// Bounded snippet of the raw model text.
        snippet: String,
    },

    /// The parsed value did not match the stage's shape contract.
    #[error("Shape mismatch: field '{field}' {reason}")]
    ShapeMismatch {
        /// The offending field, as a path into the value.
        field: String,
        /// Why the field failed validation.
        reason: String,
        /// Bounded snippet of the raw model text.
        snippet: String,
    },
}

impl ExtractError {
    /// Creates a no-structured-value error from the raw model text.
    #[must_use]
    pub fn no_structured_value(raw_text: &str) -> Self {
        Self::NoStructuredValueFound {
            snippet: truncate_snippet(raw_text, RAW_SNIPPET_MAX_CHARS),
        }
    }

    /// Creates a shape mismatch error naming the offending field.
    #[must_use]
    pub fn shape_mismatch(
        field: impl Into<String>,
        reason: impl Into<String>,
        raw_text: &str,
    ) -> Self {
        Self::ShapeMismatch {
            field: field.into(),
            reason: reason.into(),
            snippet: truncate_snippet(raw_text, RAW_SNIPPET_MAX_CHARS),
        }
    }

    /// The bounded raw-text snippet attached to this failure.
    #[must_use]
    pub fn snippet(&self) -> &str {
        match self {
            Self::NoStructuredValueFound { snippet } | Self::ShapeMismatch { snippet, .. } => {
                snippet
            }
        }
    }
}
