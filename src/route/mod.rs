//! Request routing
//!
//! The router owns the per-request procedure: budget gate, candidate
//! selection, breaker and rate-window admission, the timeout-bounded provider
//! invocation, and outcome accounting. Fallback is across providers only;
//! a provider is never retried within one request.

pub mod select;

pub use select::{Candidate, QUALITY_BOOST, SPECIALTY_BOOST};

use crate::classify::Classifier;
use crate::common::Clock;
use crate::config::ProviderSpec;
use crate::metrics::Outcome;
use crate::provider::{ClientError, ClientRegistry};
use crate::store::StateStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Cumulative per-user spend cap in USD. The gate refuses a request only
/// once spend is strictly above the cap, so the crossing request completes.
pub const USER_BUDGET_USD: f64 = 1.00;

/// Provider call deadline when the request carries no timeout_ms
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Ranking preference among the candidate providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Cost,
    Speed,
    Quality,
}

/// Per-request routing preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestPreferences {
    pub priority: Priority,
    pub max_cost_per_request: Option<f64>,
    pub timeout_ms: Option<u64>,
}

/// Incoming chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub preferences: Option<RequestPreferences>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(Error::validation("prompt must not be empty"));
        }
        if let Some(prefs) = &self.preferences {
            if let Some(cap) = prefs.max_cost_per_request {
                if cap <= 0.0 {
                    return Err(Error::validation("max_cost_per_request must be positive"));
                }
            }
            if let Some(timeout) = prefs.timeout_ms {
                if timeout == 0 {
                    return Err(Error::validation("timeout_ms must be positive"));
                }
            }
        }
        Ok(())
    }
}

/// Outgoing chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub provider_used: String,
    pub content: String,
    pub latency_ms: u64,
    pub cost: f64,
}

/// The routing engine
pub struct Router {
    specs: Vec<Arc<ProviderSpec>>,
    registry: ClientRegistry,
    store: Arc<StateStore>,
    classifier: Classifier,
    clock: Arc<dyn Clock>,
}

impl Router {
    /// Create a router over a provider table. The table is sorted by name so
    /// score ties resolve deterministically.
    pub fn new(
        mut specs: Vec<Arc<ProviderSpec>>,
        registry: ClientRegistry,
        store: Arc<StateStore>,
        classifier: Classifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        Router {
            specs,
            registry,
            store,
            classifier,
            clock,
        }
    }

    pub fn specs(&self) -> &[Arc<ProviderSpec>] {
        &self.specs
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Route one chat request through the candidate list
    pub async fn route(&self, request: &ChatRequest) -> Result<ChatResponse> {
        request.validate()?;

        let request_id = Uuid::new_v4();

        // Budget gate. Intentionally check-then-charge: a user's concurrent
        // in-flight requests may overshoot the cap by at most one request.
        if let Some(user_id) = &request.user_id {
            let spent = self.store.get_user_spend(user_id);
            if spent > USER_BUDGET_USD {
                info!(%request_id, user_id, spent, "budget exceeded");
                return Err(Error::BudgetExceeded);
            }
        }

        let prefs = request.preferences.clone().unwrap_or_default();
        let kind = self.classifier.classify(&request.prompt);
        let candidates = select::select(
            &self.specs,
            &self.store,
            &request.prompt,
            kind,
            &prefs,
            self.clock.now(),
        );

        debug!(
            %request_id,
            %kind,
            priority = ?prefs.priority,
            candidates = candidates.len(),
            "selected candidates"
        );

        if candidates.is_empty() {
            return Err(Error::NoProvidersAvailable);
        }

        let timeout = Duration::from_millis(prefs.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS));

        for candidate in &candidates {
            let name = candidate.spec.name.as_str();
            let now = self.clock.now();

            // Consuming breaker admission; at most one caller wins an
            // open provider's probe slot.
            let admission = self.store.update_breaker(name, |s| s.try_admit(now));
            if admission == crate::breaker::Admission::Rejected {
                debug!(%request_id, provider = name, "breaker refused admission");
                continue;
            }

            // Consume a rate-window slot. The pre-filter only observed the
            // window, so a concurrent request may have exhausted it since.
            if !self
                .store
                .record_rate_hit(name, candidate.spec.rate_limit_rpm, now)
            {
                debug!(%request_id, provider = name, "rate window full");
                self.store.bump_metrics(name, &Outcome::RateLimited);
                self.store
                    .update_breaker(name, |s| s.record_rate_limited(now));
                continue;
            }

            let Some(client) = self.registry.get(name) else {
                warn!(provider = name, "no client registered for provider");
                continue;
            };

            // No store lock is held here; the invocation may suspend.
            let outcome = tokio::time::timeout(timeout, client.chat(&request.prompt, timeout)).await;
            let now = self.clock.now();

            match outcome {
                Ok(Ok(reply)) => {
                    self.store.update_breaker(name, |s| s.record_success());
                    self.store.bump_metrics(
                        name,
                        &Outcome::Success {
                            latency_ms: reply.latency_ms,
                            cost: reply.cost,
                        },
                    );
                    if let Some(user_id) = &request.user_id {
                        self.store.add_user_spend(user_id, reply.cost);
                    }
                    info!(
                        %request_id,
                        provider = name,
                        latency_ms = reply.latency_ms,
                        cost = reply.cost,
                        "request served"
                    );
                    return Ok(ChatResponse {
                        provider_used: name.to_string(),
                        content: reply.content,
                        latency_ms: reply.latency_ms,
                        cost: reply.cost,
                    });
                }
                Ok(Err(ClientError::RateLimited(msg))) => {
                    debug!(%request_id, provider = name, %msg, "provider rate limited");
                    self.store.bump_metrics(name, &Outcome::RateLimited);
                    self.store
                        .update_breaker(name, |s| s.record_rate_limited(now));
                }
                Ok(Err(ClientError::Other(msg))) => {
                    warn!(%request_id, provider = name, %msg, "provider failed");
                    self.store.bump_metrics(name, &Outcome::Failure);
                    self.store.update_breaker(name, |s| s.record_failure(now));
                }
                Err(_) => {
                    warn!(
                        %request_id,
                        provider = name,
                        timeout_ms = timeout.as_millis() as u64,
                        "provider call timed out"
                    );
                    self.store.bump_metrics(name, &Outcome::Failure);
                    self.store.update_breaker(name, |s| s.record_failure(now));
                }
            }
        }

        Err(Error::NoProvidersAvailable)
    }
}
