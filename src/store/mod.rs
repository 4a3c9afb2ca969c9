//! Shared in-memory state store
//!
//! Thread-safe home for breaker states, rate windows, user spend, the
//! manual-down set, and the metrics counters. Every value sits behind its own
//! `parking_lot::Mutex` keyed by provider name or user id; the `DashMap`
//! shard locks guard the maps only while an entry is being inserted. Cells
//! are cloned out as `Arc`s before locking, so no map lock is held during a
//! critical section and no lock of any kind is held across a provider call.

use crate::breaker::BreakerState;
use crate::limiter::RateWindow;
use crate::metrics::{Outcome, ProviderMetrics};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Central mutable state shared by all request handlers
#[derive(Default)]
pub struct StateStore {
    breakers: DashMap<String, Arc<Mutex<BreakerState>>>,
    windows: DashMap<String, Arc<Mutex<RateWindow>>>,
    spend: DashMap<String, Arc<Mutex<f64>>>,
    manual_down: DashMap<String, ()>,
    metrics: DashMap<String, Arc<Mutex<ProviderMetrics>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn breaker_cell(&self, name: &str) -> Arc<Mutex<BreakerState>> {
        self.breakers
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    fn window_cell(&self, name: &str) -> Arc<Mutex<RateWindow>> {
        self.windows.entry(name.to_string()).or_default().clone()
    }

    fn spend_cell(&self, user_id: &str) -> Arc<Mutex<f64>> {
        self.spend.entry(user_id.to_string()).or_default().clone()
    }

    fn metrics_cell(&self, name: &str) -> Arc<Mutex<ProviderMetrics>> {
        self.metrics.entry(name.to_string()).or_default().clone()
    }

    /// Snapshot of one provider's breaker state
    pub fn get_breaker(&self, name: &str) -> BreakerState {
        self.breaker_cell(name).lock().clone()
    }

    /// Read-modify-write on one provider's breaker, atomic w.r.t. concurrent
    /// callers on the same provider
    pub fn update_breaker<R>(&self, name: &str, f: impl FnOnce(&mut BreakerState) -> R) -> R {
        let cell = self.breaker_cell(name);
        let mut state = cell.lock();
        f(&mut state)
    }

    /// Consume a rate-window slot; false means the provider is over its rpm
    pub fn record_rate_hit(&self, name: &str, rpm: u32, now: Instant) -> bool {
        let cell = self.window_cell(name);
        let mut window = cell.lock();
        window.admit(rpm, now)
    }

    /// Current request count in the provider's window, check-only
    pub fn current_rate(&self, name: &str, now: Instant) -> usize {
        let cell = self.window_cell(name);
        let mut window = cell.lock();
        window.current(now)
    }

    /// Cumulative spend for a user; 0 before the first charge
    pub fn get_user_spend(&self, user_id: &str) -> f64 {
        self.spend
            .get(user_id)
            .map(|cell| *cell.lock())
            .unwrap_or(0.0)
    }

    /// Charge a user; the entry is created lazily on first use
    pub fn add_user_spend(&self, user_id: &str, amount: f64) {
        let cell = self.spend_cell(user_id);
        *cell.lock() += amount;
    }

    pub fn set_manual_down(&self, name: &str, down: bool) {
        if down {
            self.manual_down.insert(name.to_string(), ());
        } else {
            self.manual_down.remove(name);
        }
    }

    pub fn is_manual_down(&self, name: &str) -> bool {
        self.manual_down.contains_key(name)
    }

    /// Record one attempt outcome for a provider
    pub fn bump_metrics(&self, name: &str, outcome: &Outcome) {
        let cell = self.metrics_cell(name);
        let mut metrics = cell.lock();
        metrics.record(outcome);
    }

    /// Snapshot of one provider's counters; zeroed before the first attempt
    pub fn get_metrics(&self, name: &str) -> ProviderMetrics {
        self.metrics
            .get(name)
            .map(|cell| cell.lock().clone())
            .unwrap_or_default()
    }

    /// Clone out every provider's counters
    pub fn snapshot_metrics(&self) -> HashMap<String, ProviderMetrics> {
        self.metrics
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().lock().clone()))
            .collect()
    }
}
