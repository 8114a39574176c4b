//! Stage kind and status enums plus the stage entity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of work a stage performs, in fixed workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Capture the project requirements into a structured profile.
    RequirementCollection,
    /// Analyze risks and candidate approaches for the captured profile.
    RiskAnalysis,
    /// Recommend a technology stack.
    TechStack,
    /// Draw the MVP boundary: what ships first, what waits.
    MvpBoundary,
    /// Design the architecture/flow diagrams.
    DiagramDesign,
    /// Generate the final planning document.
    DocumentGeneration,
}

impl StageKind {
    /// All stage kinds in workflow order.
    pub const ALL: [Self; 6] = [
        Self::RequirementCollection,
        Self::RiskAnalysis,
        Self::TechStack,
        Self::MvpBoundary,
        Self::DiagramDesign,
        Self::DocumentGeneration,
    ];

    /// Zero-based position of this kind in the workflow order.
    #[must_use]
    pub fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|k| *k == self)
            .unwrap_or_default()
    }

    /// Stable one-based ordinal, used as the stage id.
    #[must_use]
    pub fn ordinal(self) -> usize {
        self.position() + 1
    }

    /// The next stage kind in workflow order, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.position() + 1).copied()
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequirementCollection => write!(f, "requirement_collection"),
            Self::RiskAnalysis => write!(f, "risk_analysis"),
            Self::TechStack => write!(f, "tech_stack"),
            Self::MvpBoundary => write!(f, "mvp_boundary"),
            Self::DiagramDesign => write!(f, "diagram_design"),
            Self::DocumentGeneration => write!(f, "document_generation"),
        }
    }
}

/// The lock state of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Not reachable yet; earlier stages are incomplete.
    Locked,
    /// The single stage currently accepting a generation step.
    Active,
    /// Finished; viewable read-only, never reverts except via reset.
    Completed,
}

impl StageStatus {
    /// Whether the stage is currently active.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether the stage has completed.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "locked"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// One ordered step of the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Stable one-based ordinal.
    pub id: usize,
    /// What this stage does.
    pub kind: StageKind,
    /// Current lock state.
    pub status: StageStatus,
}

impl Stage {
    /// Creates a stage in the given status.
    #[must_use]
    pub fn new(kind: StageKind, status: StageStatus) -> Self {
        Self {
            id: kind.ordinal(),
            kind,
            status,
        }
    }
}
