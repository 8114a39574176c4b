//! Mock LLM client.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::LlmError;
use crate::llm::{InvokeOptions, LlmClient};

/// Scripted mock client.
///
/// Replies are consumed front-to-back; once the script is exhausted,
/// the configured fallback (default: `EmptyResponse`) repeats forever,
/// which makes "fails on every attempt" scenarios easy to express.
pub struct MockLlmClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: Mutex<Result<String, LlmError>>,
    call_count: AtomicUsize,
    last_context: Mutex<Option<String>>,
}

impl MockLlmClient {
    /// Creates a mock with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Err(LlmError::EmptyResponse)),
            call_count: AtomicUsize::new(0),
            last_context: Mutex::new(None),
        }
    }

    /// Queues a successful reply.
    #[must_use]
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().push_back(Ok(text.into()));
        self
    }

    /// Queues a failure.
    #[must_use]
    pub fn with_failure(self, error: LlmError) -> Self {
        self.replies.lock().push_back(Err(error));
        self
    }

    /// Sets the outcome repeated once the script is exhausted.
    #[must_use]
    pub fn with_repeating_failure(self, error: LlmError) -> Self {
        *self.fallback.lock() = Err(error);
        self
    }

    /// Number of invocations so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// The context message of the most recent invocation.
    #[must_use]
    pub fn last_context(&self) -> Option<String> {
        self.last_context.lock().clone()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn invoke(
        &self,
        _system_prompt: &str,
        context: &str,
        _options: &InvokeOptions,
    ) -> Result<String, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock() = Some(context.to_string());

        match self.replies.lock().pop_front() {
            Some(outcome) => outcome,
            None => self.fallback.lock().clone(),
        }
    }
}
