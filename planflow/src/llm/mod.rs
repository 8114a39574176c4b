//! LLM invocation: provider configuration, the client trait, and the
//! HTTP implementation.
//!
//! A client issues exactly one remote call per invocation and
//! classifies failures; all retry policy lives with the orchestrator.

mod client;
mod config;
mod http;

pub use client::{ensure_non_empty, InvokeOptions, LlmClient};
pub use config::{LlmConfig, DEFAULT_TIMEOUT_MS};
pub use http::HttpLlmClient;
