//! The workflow state aggregate and its transition rules.
//!
//! `WorkflowState` is an explicit owned value: every engine operation
//! is a method on the value the caller holds, so there is no shared
//! "current stage" hiding behind a global. The state machine is
//! Locked → Active → Completed, strictly left-to-right over the fixed
//! kind order, with at most one active stage (zero only once all
//! stages have completed).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Stage, StageKind, StageStatus};
use crate::errors::InvalidTransitionError;

/// The ordered sequence of stages plus bookkeeping.
///
/// Serializable so an external session store can persist it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    stages: Vec<Stage>,
    created_at: DateTime<Utc>,
}

impl WorkflowState {
    /// Creates the initial workflow: the first stage active, the rest
    /// locked.
    #[must_use]
    pub fn initialize() -> Self {
        let stages = StageKind::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let status = if i == 0 {
                    StageStatus::Active
                } else {
                    StageStatus::Locked
                };
                Stage::new(*kind, status)
            })
            .collect();

        Self {
            stages,
            created_at: Utc::now(),
        }
    }

    /// All stages in workflow order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// When this workflow was initialized (or last reset).
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The stage entity for a kind.
    #[must_use]
    pub fn stage(&self, kind: StageKind) -> &Stage {
        &self.stages[kind.position()]
    }

    /// Whether the stage is enterable: active, or completed (viewable
    /// read-only).
    #[must_use]
    pub fn can_enter(&self, kind: StageKind) -> bool {
        !matches!(self.stage(kind).status, StageStatus::Locked)
    }

    /// The kind of the active stage, or `None` once all stages have
    /// completed.
    #[must_use]
    pub fn active_kind(&self) -> Option<StageKind> {
        self.stages
            .iter()
            .find(|s| s.status.is_active())
            .map(|s| s.kind)
    }

    /// The active stage, or the last stage when the workflow is
    /// finished.
    #[must_use]
    pub fn current_stage(&self) -> &Stage {
        self.stages
            .iter()
            .find(|s| s.status.is_active())
            .unwrap_or_else(|| &self.stages[self.stages.len() - 1])
    }

    /// Whether every stage has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stages.iter().all(|s| s.status.is_completed())
    }

    /// Completes the active stage and unlocks the next one.
    ///
    /// Fails without mutating anything if `kind` is not the active
    /// stage.
    pub fn mark_completed(&mut self, kind: StageKind) -> Result<(), InvalidTransitionError> {
        let status = self.stage(kind).status;
        if !status.is_active() {
            return Err(InvalidTransitionError::new(kind, status));
        }

        self.stages[kind.position()].status = StageStatus::Completed;
        if let Some(next) = kind.next() {
            self.stages[next.position()].status = StageStatus::Active;
            tracing::debug!(completed = %kind, activated = %next, "stage completed");
        } else {
            tracing::debug!(completed = %kind, "workflow finished");
        }
        Ok(())
    }

    /// Returns the workflow to its initial configuration. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::initialize();
        tracing::debug!("workflow reset");
    }

    /// A progress summary for callers rendering the workflow.
    #[must_use]
    pub fn progress(&self) -> WorkflowProgress {
        WorkflowProgress {
            completed: self
                .stages
                .iter()
                .filter(|s| s.status.is_completed())
                .count(),
            total: self.stages.len(),
            active: self.active_kind(),
        }
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::initialize()
    }
}

/// Completion summary over the whole workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowProgress {
    /// Number of completed stages.
    pub completed: usize,
    /// Total number of stages.
    pub total: usize,
    /// The active stage kind, if any.
    pub active: Option<StageKind>,
}

impl WorkflowProgress {
    /// Returns the completion percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }
}
