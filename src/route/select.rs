//! Candidate selection
//!
//! Filters the provider table down to admissible candidates and orders them
//! by the request's priority, with a 10% specialty boost. Breaker and rate
//! checks here are observations only; the router consumes the actual
//! admission immediately before invoking, so a provider filtered in here can
//! still be refused at invocation time by a concurrent request.

use super::{Priority, RequestPreferences};
use crate::classify::PromptKind;
use crate::config::ProviderSpec;
use crate::cost;
use crate::store::StateStore;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Score multiplier for specialists under cost and speed priority
pub const SPECIALTY_BOOST: f64 = 0.9;

/// Score multiplier for specialists under quality priority; quality scores
/// are negated, so scaling up improves them by the same 10%
pub const QUALITY_BOOST: f64 = 1.1;

/// One ranked provider
#[derive(Debug, Clone)]
pub struct Candidate {
    pub spec: Arc<ProviderSpec>,
    pub score: f64,
}

/// Produce the ordered candidate list for a request
pub fn select(
    specs: &[Arc<ProviderSpec>],
    store: &StateStore,
    prompt: &str,
    kind: PromptKind,
    prefs: &RequestPreferences,
    now: Instant,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = specs
        .iter()
        .filter(|spec| !store.is_manual_down(&spec.name))
        .filter(|spec| store.get_breaker(&spec.name).admissible(now))
        .filter(|spec| store.current_rate(&spec.name, now) < spec.rate_limit_rpm as usize)
        .filter(|spec| match prefs.max_cost_per_request {
            Some(cap) => cost::estimate(prompt, spec) <= cap,
            None => true,
        })
        .map(|spec| Candidate {
            spec: spec.clone(),
            score: score(spec, prompt, kind, prefs.priority),
        })
        .collect();

    // Stable sort: equal scores keep the table's name order.
    candidates.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
    candidates
}

fn score(spec: &ProviderSpec, prompt: &str, kind: PromptKind, priority: Priority) -> f64 {
    let base = match priority {
        Priority::Cost => cost::estimate(prompt, spec),
        Priority::Speed => spec.latency_ms as f64,
        Priority::Quality => -spec.quality_score,
    };
    if !spec.is_specialist(kind) {
        return base;
    }
    match priority {
        Priority::Cost | Priority::Speed => base * SPECIALTY_BOOST,
        Priority::Quality => base * QUALITY_BOOST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_spec;
    use crate::metrics::Outcome;

    fn specs(list: Vec<ProviderSpec>) -> Vec<Arc<ProviderSpec>> {
        list.into_iter().map(Arc::new).collect()
    }

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.spec.name.as_str()).collect()
    }

    fn prefs(priority: Priority) -> RequestPreferences {
        RequestPreferences {
            priority,
            ..Default::default()
        }
    }

    #[test]
    fn test_cost_order_beats_specialty() {
        // A is cheaper; B's code specialty boost is not enough to flip.
        let mut a = test_spec("a");
        a.cost_per_token = 0.002;
        a.specialties = vec![PromptKind::Writing];
        let mut b = test_spec("b");
        b.cost_per_token = 0.003;
        b.specialties = vec![PromptKind::Code];

        let table = specs(vec![a, b]);
        let store = StateStore::new();
        // Single-token prompt keeps scores equal to the per-token price.
        let got = select(
            &table,
            &store,
            "def",
            PromptKind::Code,
            &prefs(Priority::Cost),
            Instant::now(),
        );
        assert_eq!(names(&got), vec!["a", "b"]);
        assert!((got[0].score - 0.002).abs() < 1e-12);
        assert!((got[1].score - 0.0027).abs() < 1e-12);
    }

    #[test]
    fn test_specialty_boost_flips_order() {
        let mut a = test_spec("a");
        a.cost_per_token = 0.0044;
        a.specialties = vec![PromptKind::Code];
        let mut b = test_spec("b");
        b.cost_per_token = 0.0040;
        b.specialties = vec![PromptKind::Writing];

        let table = specs(vec![a, b]);
        let store = StateStore::new();
        let got = select(
            &table,
            &store,
            "def",
            PromptKind::Code,
            &prefs(Priority::Cost),
            Instant::now(),
        );
        // A: 0.0044 * 0.9 = 0.00396 < B: 0.0040
        assert_eq!(names(&got), vec!["a", "b"]);
    }

    #[test]
    fn test_speed_priority_orders_by_latency() {
        let mut a = test_spec("a");
        a.latency_ms = 2000;
        let mut b = test_spec("b");
        b.latency_ms = 800;

        let table = specs(vec![a, b]);
        let store = StateStore::new();
        let got = select(
            &table,
            &store,
            "anything",
            PromptKind::Analysis,
            &prefs(Priority::Speed),
            Instant::now(),
        );
        assert_eq!(names(&got), vec!["b", "a"]);
    }

    #[test]
    fn test_quality_priority_prefers_specialist() {
        let mut a = test_spec("a");
        a.quality_score = 0.90;
        a.specialties = vec![PromptKind::Analysis];
        let mut b = test_spec("b");
        b.quality_score = 0.95;

        let table = specs(vec![a, b]);
        let store = StateStore::new();
        let got = select(
            &table,
            &store,
            "compare these figures",
            PromptKind::Analysis,
            &prefs(Priority::Quality),
            Instant::now(),
        );
        // A: -0.90 * 1.1 = -0.99 < B: -0.95
        assert_eq!(names(&got), vec!["a", "b"]);
    }

    #[test]
    fn test_tie_broken_by_table_order() {
        let table = specs(vec![test_spec("alpha"), test_spec("beta")]);
        let store = StateStore::new();
        let got = select(
            &table,
            &store,
            "same price",
            PromptKind::Analysis,
            &prefs(Priority::Cost),
            Instant::now(),
        );
        assert_eq!(names(&got), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_manual_down_filtered() {
        let table = specs(vec![test_spec("a"), test_spec("b")]);
        let store = StateStore::new();
        store.set_manual_down("a", true);

        let got = select(
            &table,
            &store,
            "x",
            PromptKind::Analysis,
            &prefs(Priority::Cost),
            Instant::now(),
        );
        assert_eq!(names(&got), vec!["b"]);
    }

    #[test]
    fn test_open_breaker_filtered() {
        let table = specs(vec![test_spec("a"), test_spec("b")]);
        let store = StateStore::new();
        let now = Instant::now();
        store.update_breaker("a", |s| {
            for _ in 0..3 {
                s.record_failure(now);
            }
        });

        let got = select(
            &table,
            &store,
            "x",
            PromptKind::Analysis,
            &prefs(Priority::Cost),
            now,
        );
        assert_eq!(names(&got), vec!["b"]);

        // After the reset window the provider is probe-eligible again.
        let later = now + std::time::Duration::from_secs(61);
        let got = select(
            &table,
            &store,
            "x",
            PromptKind::Analysis,
            &prefs(Priority::Cost),
            later,
        );
        assert_eq!(names(&got), vec!["a", "b"]);
    }

    #[test]
    fn test_full_window_filtered() {
        let mut a = test_spec("a");
        a.rate_limit_rpm = 1;
        let table = specs(vec![a, test_spec("b")]);
        let store = StateStore::new();
        let now = Instant::now();
        assert!(store.record_rate_hit("a", 1, now));

        let got = select(
            &table,
            &store,
            "x",
            PromptKind::Analysis,
            &prefs(Priority::Cost),
            now,
        );
        assert_eq!(names(&got), vec!["b"]);
    }

    #[test]
    fn test_cost_cap_filters_expensive_providers() {
        let mut a = test_spec("a");
        a.cost_per_token = 0.01;
        let mut b = test_spec("b");
        b.cost_per_token = 0.0001;
        let table = specs(vec![a, b]);
        let store = StateStore::new();

        let request_prefs = RequestPreferences {
            priority: Priority::Cost,
            max_cost_per_request: Some(0.01),
            timeout_ms: None,
        };
        // 40 bytes -> 10 tokens: a estimates 0.1, b estimates 0.001.
        let prompt = "x".repeat(40);
        let got = select(
            &table,
            &store,
            &prompt,
            PromptKind::Analysis,
            &request_prefs,
            Instant::now(),
        );
        assert_eq!(names(&got), vec!["b"]);
    }

    #[test]
    fn test_selection_ignores_metrics_history() {
        // Determinism: identical inputs and state give identical output.
        let table = specs(vec![test_spec("a"), test_spec("b")]);
        let store = StateStore::new();
        store.bump_metrics("b", &Outcome::Failure);

        let now = Instant::now();
        let first = select(
            &table,
            &store,
            "x",
            PromptKind::Analysis,
            &prefs(Priority::Cost),
            now,
        );
        let second = select(
            &table,
            &store,
            "x",
            PromptKind::Analysis,
            &prefs(Priority::Cost),
            now,
        );
        assert_eq!(names(&first), names(&second));
    }
}
