//! Timer system for Horizon Shell.
//!
//! Provides one-shot and repeating timers. The manager does not own a clock:
//! every call that depends on time receives the current instant, which keeps
//! timer behavior deterministic under a [`ManualClock`](crate::ManualClock).

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::{CoreError, Result};

/// Floor for repeating intervals; a zero interval would never leave the queue.
const MIN_REPEAT_INTERVAL: Duration = Duration::from_millis(1);

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// The type of timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once after the specified duration.
    OneShot,
    /// Fires repeatedly at the specified interval.
    Repeating,
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer should next fire.
    next_fire: Instant,
    /// The interval for repeating timers.
    interval: Duration,
    /// The kind of timer.
    kind: TimerKind,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages a set of cancellable timers.
#[derive(Debug, Default)]
pub struct TimerManager {
    /// All live timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Priority queue of pending timer fires (min-heap by fire time).
    ///
    /// Stopped timers leave stale entries behind; they are skipped lazily.
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a one-shot timer that fires `duration` after `now`.
    pub fn start_one_shot(&mut self, now: Instant, duration: Duration) -> TimerId {
        self.insert(now + duration, duration, TimerKind::OneShot)
    }

    /// Start a repeating timer that fires every `interval`, first at
    /// `now + interval`.
    ///
    /// Intervals shorter than one millisecond are raised to one millisecond.
    pub fn start_repeating(&mut self, now: Instant, interval: Duration) -> TimerId {
        let interval = interval.max(MIN_REPEAT_INTERVAL);
        self.insert(now + interval, interval, TimerKind::Repeating)
    }

    fn insert(&mut self, next_fire: Instant, interval: Duration, kind: TimerKind) -> TimerId {
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
            kind,
        });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: next_fire,
        });
        id
    }

    /// Stop and remove a timer.
    ///
    /// Returns an error if the timer already fired (one-shot) or was stopped.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        self.timers
            .remove(id)
            .map(|_| ())
            .ok_or(CoreError::InvalidTimerId)
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Drop every timer.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    /// The instant at which the next timer fires, if any.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(entry) = self.queue.peek() {
            if self.is_current(entry) {
                return Some(entry.fire_time);
            }
            self.queue.pop();
        }
        None
    }

    /// Get the duration from `now` until the next timer fires, if any.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Pop every timer whose deadline is at or before `now`.
    ///
    /// Returns the fired timer ids in deadline order. One-shot timers are
    /// removed; repeating timers are rescheduled relative to their previous
    /// deadline, so a late pump fires a repeating timer at most once.
    #[tracing::instrument(skip(self), target = "horizon_shell_core::timer", level = "trace")]
    pub fn process_expired(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            if !self.is_current(&entry) {
                continue;
            }
            let id = entry.id;

            tracing::trace!(target: "horizon_shell_core::timer", ?id, "timer fired");
            fired.push(id);

            let Some(timer) = self.timers.get_mut(id) else {
                continue;
            };
            match timer.kind {
                TimerKind::OneShot => {
                    self.timers.remove(id);
                }
                TimerKind::Repeating => {
                    let mut next = timer.next_fire + timer.interval;
                    if next <= now {
                        next = now + timer.interval;
                    }
                    timer.next_fire = next;
                    self.queue.push(TimerQueueEntry {
                        id,
                        fire_time: next,
                    });
                }
            }
        }

        fired
    }

    /// A queue entry is current when its timer still exists and has not
    /// been rescheduled since the entry was pushed.
    fn is_current(&self, entry: &TimerQueueEntry) -> bool {
        self.timers
            .get(entry.id)
            .is_some_and(|t| t.next_fire == entry.fire_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(start, ms(100));

        assert!(timers.process_expired(start + ms(99)).is_empty());
        assert_eq!(timers.process_expired(start + ms(100)), vec![id]);
        assert!(timers.process_expired(start + ms(500)).is_empty());
        assert!(!timers.is_active(id));
    }

    #[test]
    fn test_repeating_reschedules() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let id = timers.start_repeating(start, ms(16));

        assert_eq!(timers.process_expired(start + ms(16)), vec![id]);
        assert_eq!(timers.process_expired(start + ms(32)), vec![id]);
        assert!(timers.is_active(id));
        assert_eq!(timers.next_deadline(), Some(start + ms(48)));
    }

    #[test]
    fn test_zero_interval_repeating_fires_once_per_pump() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let id = timers.start_repeating(start, Duration::ZERO);
        assert_eq!(timers.process_expired(start + ms(1)), vec![id]);
        assert_eq!(timers.next_deadline(), Some(start + ms(2)));
    }

    #[test]
    fn test_stop_cancels() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(start, ms(10));
        timers.stop(id).unwrap();

        assert!(timers.process_expired(start + ms(20)).is_empty());
        assert!(timers.stop(id).is_err());
        assert_eq!(timers.active_count(), 0);
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let late = timers.start_one_shot(start, ms(30));
        let early = timers.start_one_shot(start, ms(10));

        assert_eq!(timers.process_expired(start + ms(40)), vec![early, late]);
    }

    #[test]
    fn test_time_until_next() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        assert_eq!(timers.time_until_next(start), None);
        timers.start_one_shot(start, ms(50));
        assert_eq!(timers.time_until_next(start + ms(20)), Some(ms(30)));
        assert_eq!(timers.time_until_next(start + ms(80)), Some(Duration::ZERO));
    }
}
