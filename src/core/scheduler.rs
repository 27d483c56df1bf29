//! Single-slot delayed task timer
//!
//! The reconciler retries a failed startup after a fixed delay. The timer
//! holds at most one pending deadline: scheduling again replaces the pending
//! attempt instead of stacking a second one, so only one reconciliation is
//! ever in flight. The owner pumps it from its cooperative loop with an
//! explicit `now`, which keeps the timing testable.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct RetryTimer {
    due: Option<Instant>,
}

impl RetryTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer `delay` from `now`, replacing any pending deadline.
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// Disarm and report true once the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_deadline() {
        let mut timer = RetryTimer::new();
        let start = Instant::now();
        timer.schedule(start, Duration::from_millis(500));

        assert!(!timer.fire(start));
        assert!(!timer.fire(start + Duration::from_millis(499)));
        assert!(timer.fire(start + Duration::from_millis(500)));
        assert!(!timer.is_pending());
        assert!(!timer.fire(start + Duration::from_secs(10)));
    }

    #[test]
    fn reschedule_replaces_pending() {
        let mut timer = RetryTimer::new();
        let start = Instant::now();
        timer.schedule(start, Duration::from_millis(100));
        timer.schedule(start, Duration::from_millis(500));

        // the first deadline no longer fires
        assert!(!timer.fire(start + Duration::from_millis(100)));
        assert!(timer.fire(start + Duration::from_millis(500)));
    }
}
