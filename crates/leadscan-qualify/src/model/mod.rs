//! Language-model seam.
//!
//! The pipeline only needs "prompt in, text out". [`GeminiClient`] is the
//! production implementation; tests substitute scripted fakes.

mod gemini;

use std::time::Duration;

use async_trait::async_trait;

pub use gemini::GeminiClient;

use crate::error::QualifyError;
use crate::retry::retry_with_backoff;

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send one prompt and return the model's free-text reply.
    async fn complete(&self, prompt: &str) -> Result<String, QualifyError>;

    fn model_id(&self) -> &str;
}

/// Per-call bounds applied to every classification and extraction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 2,
            backoff_base_ms: 1_000,
        }
    }
}

impl CallPolicy {
    #[must_use]
    pub fn new(timeout_secs: u64, max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
            backoff_base_ms,
        }
    }
}

/// Runs one completion under the policy's timeout, retrying transient failures.
pub(crate) async fn complete_with_policy(
    model: &dyn LanguageModel,
    prompt: &str,
    policy: &CallPolicy,
) -> Result<String, QualifyError> {
    let timeout = policy.timeout;
    retry_with_backoff(policy.max_retries, policy.backoff_base_ms, || async move {
        match tokio::time::timeout(timeout, model.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(QualifyError::Timeout {
                secs: timeout.as_secs(),
            }),
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl LanguageModel for Stalled {
        async fn complete(&self, _prompt: &str) -> Result<String, QualifyError> {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
            Ok(String::new())
        }

        fn model_id(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_model_times_out() {
        let policy = CallPolicy {
            timeout: Duration::from_secs(5),
            max_retries: 1,
            backoff_base_ms: 0,
        };
        let result = complete_with_policy(&Stalled, "hello", &policy).await;
        assert!(matches!(result, Err(QualifyError::Timeout { secs: 5 })));
    }
}
