//! Per-provider circuit breaker
//!
//! ```text
//! Closed --[3 consecutive failures]--> Open
//! Open --[60s elapsed, probe slot free]--> HalfOpen (single probe)
//! HalfOpen --[probe success]--> Closed
//! HalfOpen --[probe failure or rate limit]--> Open
//! ```
//!
//! The state itself carries no lock; it lives inside the state store and all
//! transitions run under the store's per-provider lock. Admission comes in
//! two forms: `admissible` is the check-only variant used by the selection
//! pre-filter, `try_admit` is the consuming variant the router calls right
//! before invoking the provider. Only `try_admit` takes the probe slot, so a
//! request that never reaches the provider cannot strand a probe.

use std::fmt;
use std::time::{Duration, Instant};

/// Consecutive failures needed to trip the breaker
pub const FAILURE_THRESHOLD: u32 = 3;

/// Seconds an open breaker waits before allowing a probe
pub const RESET_SECONDS: u64 = 60;

/// Circuit breaker status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitStatus {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitStatus::Closed => write!(f, "CLOSED"),
            CircuitStatus::Open => write!(f, "OPEN"),
            CircuitStatus::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Outcome of a consuming admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Breaker is closed, request proceeds normally
    Normal,
    /// This caller won the single half-open probe slot
    Probe,
    /// Breaker is open or the probe slot is taken
    Rejected,
}

/// Mutable breaker state for one provider
#[derive(Debug, Clone)]
pub struct BreakerState {
    pub status: CircuitStatus,
    pub consecutive_failures: u32,
    pub opened_at: Option<Instant>,
    pub half_open_in_flight: bool,
}

impl Default for BreakerState {
    fn default() -> Self {
        BreakerState {
            status: CircuitStatus::Closed,
            consecutive_failures: 0,
            opened_at: None,
            half_open_in_flight: false,
        }
    }
}

impl BreakerState {
    fn reset_elapsed(&self, now: Instant) -> bool {
        match self.opened_at {
            Some(at) => now.saturating_duration_since(at) >= Duration::from_secs(RESET_SECONDS),
            None => false,
        }
    }

    /// Check-only admission, used by the selection pre-filter. True for a
    /// closed breaker or an open one whose probe slot could be taken now.
    pub fn admissible(&self, now: Instant) -> bool {
        match self.status {
            CircuitStatus::Closed => true,
            CircuitStatus::Open => !self.half_open_in_flight && self.reset_elapsed(now),
            CircuitStatus::HalfOpen => false,
        }
    }

    /// Consuming admission. At most one concurrent caller gets `Probe`: the
    /// one that flips `half_open_in_flight` while performing the
    /// Open -> HalfOpen transition.
    pub fn try_admit(&mut self, now: Instant) -> Admission {
        match self.status {
            CircuitStatus::Closed => Admission::Normal,
            CircuitStatus::Open => {
                if !self.half_open_in_flight && self.reset_elapsed(now) {
                    self.status = CircuitStatus::HalfOpen;
                    self.half_open_in_flight = true;
                    Admission::Probe
                } else {
                    Admission::Rejected
                }
            }
            CircuitStatus::HalfOpen => Admission::Rejected,
        }
    }

    /// A call succeeded; close the breaker regardless of prior state.
    pub fn record_success(&mut self) {
        self.status = CircuitStatus::Closed;
        self.consecutive_failures = 0;
        self.opened_at = None;
        self.half_open_in_flight = false;
    }

    /// A call failed (timeout included). A failed probe re-opens the breaker
    /// keeping the failure count; in closed state the count increments and
    /// trips the breaker at the threshold.
    pub fn record_failure(&mut self, now: Instant) {
        match self.status {
            CircuitStatus::HalfOpen => {
                self.status = CircuitStatus::Open;
                self.opened_at = Some(now);
                self.half_open_in_flight = false;
            }
            CircuitStatus::Closed => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= FAILURE_THRESHOLD {
                    self.status = CircuitStatus::Open;
                    self.opened_at = Some(now);
                }
            }
            CircuitStatus::Open => {}
        }
    }

    /// A call was rate-limited. Never counts toward the failure threshold,
    /// but a rate-limited probe sends the breaker back to open.
    pub fn record_rate_limited(&mut self, now: Instant) {
        if self.status == CircuitStatus::HalfOpen {
            self.status = CircuitStatus::Open;
            self.opened_at = Some(now);
            self.half_open_in_flight = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_trips_after_threshold_failures() {
        let t0 = Instant::now();
        let mut state = BreakerState::default();

        state.record_failure(t0);
        state.record_failure(t0);
        assert_eq!(state.status, CircuitStatus::Closed);

        state.record_failure(t0);
        assert_eq!(state.status, CircuitStatus::Open);
        assert_eq!(state.opened_at, Some(t0));
        assert_eq!(state.consecutive_failures, 3);
    }

    #[test]
    fn test_success_resets_failure_count() {
        let t0 = Instant::now();
        let mut state = BreakerState::default();

        state.record_failure(t0);
        state.record_failure(t0);
        state.record_success();
        assert_eq!(state.consecutive_failures, 0);

        state.record_failure(t0);
        state.record_failure(t0);
        assert_eq!(state.status, CircuitStatus::Closed);
    }

    #[test]
    fn test_rate_limited_never_counts() {
        let t0 = Instant::now();
        let mut state = BreakerState::default();

        for _ in 0..10 {
            state.record_rate_limited(t0);
        }
        assert_eq!(state.status, CircuitStatus::Closed);
        assert_eq!(state.consecutive_failures, 0);
    }

    #[test]
    fn test_open_blocks_until_reset() {
        let t0 = Instant::now();
        let mut state = BreakerState::default();
        for _ in 0..3 {
            state.record_failure(t0);
        }

        assert!(!state.admissible(t0 + secs(59)));
        assert_eq!(state.try_admit(t0 + secs(59)), Admission::Rejected);

        assert!(state.admissible(t0 + secs(60)));
    }

    #[test]
    fn test_single_probe_slot() {
        let t0 = Instant::now();
        let mut state = BreakerState::default();
        for _ in 0..3 {
            state.record_failure(t0);
        }

        let t = t0 + secs(61);
        assert_eq!(state.try_admit(t), Admission::Probe);
        assert_eq!(state.status, CircuitStatus::HalfOpen);
        assert!(state.half_open_in_flight);

        // Second caller loses the race.
        assert_eq!(state.try_admit(t), Admission::Rejected);
        assert!(!state.admissible(t));
    }

    #[test]
    fn test_probe_success_closes() {
        let t0 = Instant::now();
        let mut state = BreakerState::default();
        for _ in 0..3 {
            state.record_failure(t0);
        }
        assert_eq!(state.try_admit(t0 + secs(61)), Admission::Probe);

        state.record_success();
        assert_eq!(state.status, CircuitStatus::Closed);
        assert_eq!(state.consecutive_failures, 0);
        assert_eq!(state.opened_at, None);
        assert!(!state.half_open_in_flight);
    }

    #[test]
    fn test_probe_failure_reopens_keeping_count() {
        let t0 = Instant::now();
        let mut state = BreakerState::default();
        for _ in 0..3 {
            state.record_failure(t0);
        }
        let t = t0 + secs(61);
        assert_eq!(state.try_admit(t), Admission::Probe);

        state.record_failure(t);
        assert_eq!(state.status, CircuitStatus::Open);
        assert_eq!(state.opened_at, Some(t));
        assert_eq!(state.consecutive_failures, 3);
        assert!(!state.half_open_in_flight);

        // The fresh opened_at restarts the reset window.
        assert!(!state.admissible(t + secs(59)));
        assert!(state.admissible(t + secs(60)));
    }

    #[test]
    fn test_rate_limited_probe_reopens() {
        let t0 = Instant::now();
        let mut state = BreakerState::default();
        for _ in 0..3 {
            state.record_failure(t0);
        }
        let t = t0 + secs(61);
        assert_eq!(state.try_admit(t), Admission::Probe);

        state.record_rate_limited(t);
        assert_eq!(state.status, CircuitStatus::Open);
        assert_eq!(state.consecutive_failures, 3);
        assert!(!state.half_open_in_flight);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(CircuitStatus::Closed.to_string(), "CLOSED");
        assert_eq!(CircuitStatus::Open.to_string(), "OPEN");
        assert_eq!(CircuitStatus::HalfOpen.to_string(), "HALF_OPEN");
    }
}
