//! Workflow orchestration.
//!
//! This module composes the stage engine, prompt registry, LLM client,
//! and response extractor into `run_stage`:
//! - Active-stage verification
//! - Context assembly from the caller's payload
//! - The bounded retry loop (transient backoff, corrective re-prompt)
//! - Completion signaling back into the workflow state

#[cfg(test)]
mod integration_tests;
mod result;
mod retry;
mod runner;

pub use result::{GenerationOutput, GenerationResult};
pub use retry::{BackoffStrategy, JitterStrategy, RetryPolicy};
pub use runner::WorkflowOrchestrator;
