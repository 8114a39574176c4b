//! Core domain model for the planning workflow.
//!
//! This module contains the fundamental types:
//! - Stage kind and status enums
//! - The stage entity
//! - The workflow state aggregate and its transition rules

mod stage;
mod state;

pub use stage::{Stage, StageKind, StageStatus};
pub use state::{WorkflowProgress, WorkflowState};
