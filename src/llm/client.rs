
use rand::Rng;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::providers::base::{LlmProvider, LlmProviderError, StructuredRequest};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_jitter: Duration,
}

impl RetryPolicy {
    pub const fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        max_jitter: Duration,
    ) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            max_jitter,
        }
    }

    
    pub const fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// Exponential delay before retrying after the `attempt`-th failure (1-based), without jitter.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.max(1).saturating_sub(1).min(16);
        let base = self.base_delay.saturating_mul(1u32 << exp);
        base.min(self.max_delay)
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let backoff = self.backoff_for_attempt(attempt);
        let jitter_ms = self.max_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return backoff;
        }
        backoff + Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            3,
            Duration::from_millis(1_000),
            Duration::from_millis(10_000),
            Duration::from_millis(500),
        )
    }
}


#[derive(Clone)]
pub struct OracleClient {
    provider: Arc<dyn LlmProvider>,
    policy: RetryPolicy,
}

impl OracleClient {
    
    pub fn new(provider: Arc<dyn LlmProvider>, policy: RetryPolicy) -> Self {
        info!(
            "OracleClient initialized: provider={}, model={}, max_attempts={}",
            provider.provider_name(),
            provider.model_name(),
            policy.max_attempts
        );
        Self { provider, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Calls the oracle until it yields a value of shape `T`, retrying only transient failures.
    /// The last error is returned once the attempt budget is spent; no business fallback here.
    pub async fn generate<T: DeserializeOwned>(
        &self,
        request: &StructuredRequest,
    ) -> Result<T, LlmProviderError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(
                "Oracle call {} ({}/{})",
                request.schema_name, attempt, max_attempts
            );

            let error = match self.provider.generate_structured(request).await {
                Ok((value, metadata)) => {
                    debug!(
                        "Oracle {} answered via {}/{} (tokens={:?})",
                        request.schema_name, metadata.provider, metadata.model, metadata.tokens_total
                    );
                    return serde_json::from_value::<T>(value)
                        .map_err(|e| LlmProviderError::Schema(e.to_string()));
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                warn!("Oracle {} failed permanently: {}", request.schema_name, error);
                return Err(error);
            }

            if attempt >= max_attempts {
                warn!(
                    "Oracle {} still failing after {} attempts: {}",
                    request.schema_name, attempt, error
                );
                return Err(error);
            }

            let delay = self.policy.delay_for_attempt(attempt);
            warn!(
                "Oracle {} transient failure (attempt {}/{}), retrying in {}ms: {}",
                request.schema_name,
                attempt,
                max_attempts,
                delay.as_millis(),
                error
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::scripted::{Scripted, ScriptedProvider};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Echo {
        word: String,
    }

    fn request() -> StructuredRequest {
        StructuredRequest {
            system_prompt: "system".to_string(),
            payload: "payload".to_string(),
            schema_name: "echo",
            schema: json!({"type": "object"}),
            temperature: 0.0,
            max_output_tokens: 64,
        }
    }

    fn overloaded() -> Scripted {
        Scripted::Fail(LlmProviderError::Status {
            status: 503,
            message: "overloaded".to_string(),
        })
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for_attempt(1), Duration::from_millis(1_000));
        assert_eq!(policy.backoff_for_attempt(2), Duration::from_millis(2_000));
        assert_eq!(policy.backoff_for_attempt(3), Duration::from_millis(4_000));
        assert_eq!(policy.backoff_for_attempt(5), Duration::from_millis(10_000));
        assert_eq!(policy.backoff_for_attempt(30), Duration::from_millis(10_000));
    }

    #[test]
    fn test_jitter_stays_in_window() {
        let policy = RetryPolicy::default();
        for _ in 0..100 {
            let delay = policy.delay_for_attempt(2);
            assert!(delay >= Duration::from_millis(2_000));
            assert!(delay < Duration::from_millis(2_500));
        }
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let provider = ScriptedProvider::new(vec![
            overloaded(),
            overloaded(),
            Scripted::Reply(json!({"word": "hi"})),
        ]);
        let client = OracleClient::new(provider.clone(), RetryPolicy::immediate(3));

        let echo: Echo = client.generate(&request()).await.unwrap();
        assert_eq!(echo.word, "hi");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let provider = ScriptedProvider::always_failing(429);
        let client = OracleClient::new(provider.clone(), RetryPolicy::immediate(3));

        let err = client.generate::<Echo>(&request()).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_short_circuits() {
        let provider = ScriptedProvider::always_failing(401);
        let client = OracleClient::new(provider.clone(), RetryPolicy::immediate(3));

        let err = client.generate::<Echo>(&request()).await.unwrap_err();
        assert!(!err.is_transient());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_permanent() {
        let provider = ScriptedProvider::replying(json!({"other": 1}));
        let client = OracleClient::new(provider.clone(), RetryPolicy::immediate(3));

        let err = client.generate::<Echo>(&request()).await.unwrap_err();
        assert!(matches!(err, LlmProviderError::Schema(_)));
        assert_eq!(provider.calls(), 1);
    }
}
