//! Mock provider client
//!
//! Simulates a backend for local runs and tests: sleeps a jittered fraction
//! of the provider's nominal latency, then fabricates a completion whose
//! cost follows the same token accounting the estimator uses.

use super::{ChatOutcome, ClientError, ProviderClient};
use crate::config::ProviderSpec;
use crate::cost::estimate_tokens;
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tokens attributed to the fabricated completion
const RESPONSE_TOKENS: u64 = 48;

/// Simulated backend built from a provider spec
pub struct MockClient {
    name: String,
    model: String,
    latency_ms: u64,
    cost_per_token: f64,
}

impl MockClient {
    pub fn new(spec: &Arc<ProviderSpec>) -> Self {
        MockClient {
            name: spec.name.clone(),
            model: spec.model.clone(),
            latency_ms: spec.latency_ms,
            cost_per_token: spec.cost_per_token,
        }
    }

    fn jittered_latency(&self) -> Duration {
        let factor = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_millis((self.latency_ms as f64 * factor) as u64)
    }
}

#[async_trait]
impl ProviderClient for MockClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(
        &self,
        prompt: &str,
        _timeout: Duration,
    ) -> Result<ChatOutcome, ClientError> {
        let start = Instant::now();
        tokio::time::sleep(self.jittered_latency()).await;

        let preview: String = prompt.chars().take(40).collect();
        let content = format!(
            "[{}] Simulated completion for: {}",
            self.model, preview
        );
        let tokens = estimate_tokens(prompt) + RESPONSE_TOKENS;

        Ok(ChatOutcome {
            content,
            latency_ms: start.elapsed().as_millis() as u64,
            cost: tokens as f64 * self.cost_per_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_spec;

    #[test]
    fn test_mock_reports_cost_and_latency() {
        let mut spec = test_spec("mock");
        spec.latency_ms = 10;
        spec.cost_per_token = 0.001;
        let client = MockClient::new(&Arc::new(spec));

        let outcome = tokio_test::block_on(async {
            client.chat("def foo():", Duration::from_secs(5)).await
        })
        .unwrap();

        assert!(outcome.content.contains("def foo():"));
        assert!(outcome.content.starts_with("[mock-model]"));
        // 10 bytes -> 3 tokens, plus the fixed response tokens.
        let expected = (3 + RESPONSE_TOKENS) as f64 * 0.001;
        assert!((outcome.cost - expected).abs() < 1e-12);
        assert!(outcome.latency_ms >= 8);
    }
}
