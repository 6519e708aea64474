//! Leading + trailing call throttling on top of [`TimerManager`].
//!
//! The first request after a quiet period runs immediately. Requests that
//! arrive sooner than `interval` after the last run collapse into a single
//! trailing timer that fires when the interval has elapsed, so the most
//! recent request is always honored.

use std::time::{Duration, Instant};

use crate::timer::{TimerId, TimerManager};

/// What the caller should do with a throttled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// Run the action now.
    Invoke,
    /// A trailing timer was started; run the action when it fires.
    Scheduled(TimerId),
    /// A trailing timer is already pending and will cover this request.
    Coalesced,
}

/// Per-key throttle state: last invocation and at most one pending timer.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_invoke: Option<Instant>,
    pending: Option<TimerId>,
}

impl Throttle {
    /// Create a throttle with the given minimum interval between runs.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_invoke: None,
            pending: None,
        }
    }

    /// The minimum interval between runs.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The pending trailing timer, if one is scheduled.
    pub fn pending(&self) -> Option<TimerId> {
        self.pending
    }

    /// Register a request at `now`.
    pub fn request(&mut self, now: Instant, timers: &mut TimerManager) -> ThrottleDecision {
        if self.pending.is_some() {
            return ThrottleDecision::Coalesced;
        }

        match self.last_invoke {
            Some(last) if now.saturating_duration_since(last) < self.interval => {
                let remaining = self.interval - now.saturating_duration_since(last);
                let id = timers.start_one_shot(now, remaining);
                self.pending = Some(id);
                ThrottleDecision::Scheduled(id)
            }
            _ => {
                self.last_invoke = Some(now);
                ThrottleDecision::Invoke
            }
        }
    }

    /// Acknowledge that timer `id` fired at `now`.
    ///
    /// Returns `true` if it was this throttle's trailing timer and the
    /// action should run.
    pub fn complete(&mut self, id: TimerId, now: Instant) -> bool {
        if self.pending != Some(id) {
            return false;
        }
        self.pending = None;
        self.last_invoke = Some(now);
        true
    }

    /// Cancel the pending trailing timer, if any.
    pub fn cancel(&mut self, timers: &mut TimerManager) {
        if let Some(id) = self.pending.take() {
            // Already fired or stopped elsewhere; nothing left to cancel.
            let _ = timers.stop(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_request_invokes() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let mut throttle = Throttle::new(ms(50));
        assert_eq!(throttle.request(start, &mut timers), ThrottleDecision::Invoke);
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn test_burst_coalesces_into_one_trailing_timer() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let mut throttle = Throttle::new(ms(50));

        assert_eq!(throttle.request(start, &mut timers), ThrottleDecision::Invoke);
        let ThrottleDecision::Scheduled(id) = throttle.request(start + ms(10), &mut timers) else {
            panic!("expected trailing timer");
        };
        assert_eq!(throttle.request(start + ms(20), &mut timers), ThrottleDecision::Coalesced);
        assert_eq!(throttle.request(start + ms(30), &mut timers), ThrottleDecision::Coalesced);
        assert_eq!(timers.active_count(), 1);

        // Trailing edge lands exactly one interval after the leading call.
        assert!(timers.process_expired(start + ms(49)).is_empty());
        assert_eq!(timers.process_expired(start + ms(50)), vec![id]);
        assert!(throttle.complete(id, start + ms(50)));
        assert_eq!(throttle.pending(), None);
    }

    #[test]
    fn test_quiet_period_invokes_again() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let mut throttle = Throttle::new(ms(50));

        throttle.request(start, &mut timers);
        assert_eq!(throttle.request(start + ms(60), &mut timers), ThrottleDecision::Invoke);
    }

    #[test]
    fn test_cancel_stops_trailing_timer() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let mut throttle = Throttle::new(ms(50));

        throttle.request(start, &mut timers);
        throttle.request(start + ms(5), &mut timers);
        throttle.cancel(&mut timers);

        assert_eq!(timers.active_count(), 0);
        assert!(timers.process_expired(start + ms(100)).is_empty());
    }

    #[test]
    fn test_complete_ignores_foreign_timer() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let mut throttle = Throttle::new(ms(50));
        let other = timers.start_one_shot(start, ms(1));
        assert!(!throttle.complete(other, start));
    }
}
