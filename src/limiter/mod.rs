//! Sliding-window rate limiting
//!
//! One window per provider, counting admitted requests over the last 60
//! seconds. Windows live inside the state store and are only touched under
//! that provider's lock; eviction happens on every read so the window never
//! grows past the provider's rpm.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Window length in seconds
pub const WINDOW_SECONDS: u64 = 60;

/// Rolling window of admitted request timestamps for one provider
#[derive(Debug, Default)]
pub struct RateWindow {
    hits: VecDeque<Instant>,
}

impl RateWindow {
    pub fn new() -> Self {
        RateWindow {
            hits: VecDeque::new(),
        }
    }

    fn evict(&mut self, now: Instant) {
        while let Some(front) = self.hits.front() {
            if now.saturating_duration_since(*front) >= Duration::from_secs(WINDOW_SECONDS) {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }

    /// Try to admit a request at `now`. Admission appends the timestamp, so
    /// at most `rpm` requests land in any rolling window.
    pub fn admit(&mut self, rpm: u32, now: Instant) -> bool {
        self.evict(now);
        if self.hits.len() < rpm as usize {
            self.hits.push_back(now);
            true
        } else {
            false
        }
    }

    /// Current request count in the window, without consuming a slot
    pub fn current(&mut self, now: Instant) -> usize {
        self.evict(now);
        self.hits.len()
    }
}
