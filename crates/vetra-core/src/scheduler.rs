//! Coalescing write scheduler for debounced persistence.
//!
//! A scheduler fires once its quiescence window has elapsed with no new
//! qualifying event. Autosave and history snapshotting are two independent
//! instances of this primitive.

use std::time::{Duration, Instant};

/// Quiescence window for autosave-to-durable-storage.
pub const AUTOSAVE_WINDOW: Duration = Duration::from_millis(500);
/// Quiescence window for history snapshots.
pub const HISTORY_WINDOW: Duration = Duration::from_millis(300);

/// A debounced, coalescing write trigger.
#[derive(Debug, Clone)]
pub struct WriteScheduler {
    window: Duration,
    dirty: bool,
    last_change: Option<Instant>,
}

impl WriteScheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            dirty: false,
            last_change: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Note a qualifying event, restarting the quiescence window.
    pub fn mark_dirty(&mut self) {
        self.mark_dirty_at(Instant::now());
    }

    /// Explicit-clock variant of [`mark_dirty`](Self::mark_dirty).
    pub fn mark_dirty_at(&mut self, now: Instant) {
        self.dirty = true;
        self.last_change = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns true (and clears the dirty flag) once the window has elapsed
    /// since the last qualifying event.
    pub fn take_if_due(&mut self) -> bool {
        self.take_if_due_at(Instant::now())
    }

    /// Explicit-clock variant of [`take_if_due`](Self::take_if_due).
    pub fn take_if_due_at(&mut self, now: Instant) -> bool {
        if !self.dirty {
            return false;
        }
        let Some(last) = self.last_change else {
            return false;
        };
        if now.duration_since(last) >= self.window {
            self.dirty = false;
            true
        } else {
            false
        }
    }

    /// Drop any pending write.
    pub fn cancel(&mut self) {
        self.dirty = false;
        self.last_change = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_due_before_window() {
        let mut sched = WriteScheduler::new(Duration::from_millis(500));
        let t0 = Instant::now();
        sched.mark_dirty_at(t0);

        assert!(!sched.take_if_due_at(t0 + Duration::from_millis(100)));
        assert!(sched.is_dirty());
    }

    #[test]
    fn test_due_after_window() {
        let mut sched = WriteScheduler::new(Duration::from_millis(500));
        let t0 = Instant::now();
        sched.mark_dirty_at(t0);

        assert!(sched.take_if_due_at(t0 + Duration::from_millis(500)));
        assert!(!sched.is_dirty());
        // One-shot: does not fire again without a new event.
        assert!(!sched.take_if_due_at(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_new_event_restarts_window() {
        let mut sched = WriteScheduler::new(Duration::from_millis(500));
        let t0 = Instant::now();
        sched.mark_dirty_at(t0);
        sched.mark_dirty_at(t0 + Duration::from_millis(400));

        // 500ms after the first event, but only 100ms after the second.
        assert!(!sched.take_if_due_at(t0 + Duration::from_millis(500)));
        assert!(sched.take_if_due_at(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_cancel_drops_pending_write() {
        let mut sched = WriteScheduler::new(Duration::from_millis(100));
        let t0 = Instant::now();
        sched.mark_dirty_at(t0);
        sched.cancel();

        assert!(!sched.take_if_due_at(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_clean_scheduler_never_fires() {
        let mut sched = WriteScheduler::new(Duration::from_millis(100));
        assert!(!sched.take_if_due());
    }
}
