//! Retry-wrapped model invocation.
//!
//! Every model call in the workspace goes through [`ModelInvoker`], so the
//! backoff policy lives in exactly one place.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::conversation::Turn;
use crate::{CompletionProvider, ModelError, ModelResponse, ToolSpec};

/// Exponential backoff for transient model failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each later one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based): `base * 2^retry`.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2_u32.saturating_pow(retry))
    }
}

/// Bookkeeping for one attempt sequence. Never outlives the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    pub attempt: u32,
    pub delay: Duration,
}

/// Retry an async operation while it fails with a transient [`ModelError`].
///
/// Non-transient errors and the error that exhausts the budget are returned
/// as-is. Cancelling `cancel` interrupts both the operation and the backoff.
pub async fn retry_with_backoff<F, Fut, T>(
    mut operation: F,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<T, ModelError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ModelError>>,
{
    let mut state = RetryState::default();

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ModelError::Cancelled),
            result = operation() => result,
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && state.attempt < policy.max_retries => {
                state.delay = policy.delay_for(state.attempt);
                state.attempt += 1;
                warn!(
                    "Rate limit hit: {e}. Retrying in {}s (retry {}/{})",
                    state.delay.as_secs_f32(),
                    state.attempt,
                    policy.max_retries
                );
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(ModelError::Cancelled),
                    () = sleep(state.delay) => {}
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// A completion provider paired with the retry policy every call must honor.
#[derive(Debug, Clone)]
pub struct ModelInvoker<P> {
    provider: P,
    policy: RetryPolicy,
}

impl<P: CompletionProvider> ModelInvoker<P> {
    pub const fn new(provider: P, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    pub async fn invoke(
        &self,
        conversation: &[Turn],
        system_instructions: &str,
        tools: Option<&[ToolSpec]>,
        cancel: &CancellationToken,
    ) -> Result<ModelResponse, ModelError> {
        retry_with_backoff(
            || {
                self.provider
                    .complete(conversation, system_instructions, tools)
            },
            &self.policy,
            cancel,
        )
        .await
    }

    /// Single-prompt convenience: returns the model's text.
    pub async fn invoke_text(
        &self,
        prompt: &str,
        system_instructions: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ModelError> {
        let conversation = [Turn::user(prompt)];
        match self
            .invoke(&conversation, system_instructions, None, cancel)
            .await?
        {
            ModelResponse::FinalText(text) => Ok(text),
            ModelResponse::ToolInvocationBatch(_) => Err(ModelError::Other(
                "model requested tools where plain text was expected".to_string(),
            )),
            ModelResponse::Empty => Err(ModelError::Other("model returned no text".to_string())),
        }
    }
}
