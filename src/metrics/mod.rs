//! Attempt metrics and aggregated reporting
//!
//! Raw counters are bumped by the router through the state store; the
//! aggregation functions here derive the per-provider and global views the
//! API serves. Division by zero always yields 0.

use crate::config::ProviderSpec;
use crate::store::StateStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of one provider attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Success { latency_ms: u64, cost: f64 },
    Failure,
    RateLimited,
}

/// Raw per-provider counters
#[derive(Debug, Clone, Default)]
pub struct ProviderMetrics {
    pub requests: u64,
    pub success: u64,
    pub failures: u64,
    pub rate_limited: u64,
    /// Summed latency of successful attempts only
    pub total_latency_ms: u64,
    pub total_cost: f64,
}

impl ProviderMetrics {
    /// Record one attempt. Every outcome bumps `requests` plus exactly one
    /// outcome counter; only successes feed the latency sum.
    pub fn record(&mut self, outcome: &Outcome) {
        self.requests += 1;
        match outcome {
            Outcome::Success { latency_ms, cost } => {
                self.success += 1;
                self.total_latency_ms += latency_ms;
                self.total_cost += cost;
            }
            Outcome::Failure => self.failures += 1,
            Outcome::RateLimited => self.rate_limited += 1,
        }
    }

    pub fn avg_latency_ms(&self) -> f64 {
        if self.success == 0 {
            0.0
        } else {
            self.total_latency_ms as f64 / self.success as f64
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.success as f64 / self.requests as f64
        }
    }
}

/// Per-provider view served by the analytics and providers endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ProviderReport {
    pub requests: u64,
    pub success: u64,
    pub failures: u64,
    pub rate_limited: u64,
    pub success_rate: f64,
    pub avg_latency_ms: f64,
    pub total_cost: f64,
    pub is_down: bool,
    pub circuit_status: String,
}

/// Whole-gateway sums
#[derive(Debug, Clone, Default, Serialize)]
pub struct GlobalReport {
    pub requests: u64,
    pub success: u64,
    pub failures: u64,
    pub rate_limited: u64,
    pub success_rate: f64,
    pub avg_latency_ms: f64,
    pub total_cost: f64,
}

/// Analytics envelope: global sums plus one report per configured provider
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub generated_at: DateTime<Utc>,
    pub global: GlobalReport,
    pub providers: BTreeMap<String, ProviderReport>,
}

/// Build one provider's report at snapshot time
pub fn provider_report(spec: &ProviderSpec, store: &StateStore) -> ProviderReport {
    let metrics = store.get_metrics(&spec.name);
    let breaker = store.get_breaker(&spec.name);
    ProviderReport {
        requests: metrics.requests,
        success: metrics.success,
        failures: metrics.failures,
        rate_limited: metrics.rate_limited,
        success_rate: metrics.success_rate(),
        avg_latency_ms: metrics.avg_latency_ms(),
        total_cost: metrics.total_cost,
        is_down: store.is_manual_down(&spec.name),
        circuit_status: breaker.status.to_string(),
    }
}

/// Read a consistent-enough snapshot across all configured providers
pub fn snapshot(specs: &[Arc<ProviderSpec>], store: &StateStore) -> AnalyticsSnapshot {
    let mut providers = BTreeMap::new();
    let mut global = GlobalReport::default();
    let mut total_latency_ms = 0u64;

    for spec in specs {
        let report = provider_report(spec, store);
        let metrics = store.get_metrics(&spec.name);
        global.requests += report.requests;
        global.success += report.success;
        global.failures += report.failures;
        global.rate_limited += report.rate_limited;
        global.total_cost += report.total_cost;
        total_latency_ms += metrics.total_latency_ms;
        providers.insert(spec.name.clone(), report);
    }

    global.success_rate = if global.requests == 0 {
        0.0
    } else {
        global.success as f64 / global.requests as f64
    };
    global.avg_latency_ms = if global.success == 0 {
        0.0
    } else {
        total_latency_ms as f64 / global.success as f64
    };

    AnalyticsSnapshot {
        generated_at: Utc::now(),
        global,
        providers,
    }
}
