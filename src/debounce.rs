use std::time::{Duration, Instant};

use tracing::trace;

/// Holds at most one pending value that becomes due `delay` after it was
/// scheduled. Scheduling again replaces the pending value and restarts the
/// delay. Dropping the debouncer discards whatever is pending.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        if self.pending.is_some() {
            trace!("Debounce: replacing pending update");
        }
        self.pending = Some((now + self.delay, value));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hands out the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn fires_once_after_the_last_keystroke() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule("a", start);
        debouncer.schedule("ac", start + Duration::from_millis(100));
        debouncer.schedule("acm", start + Duration::from_millis(250));

        assert_eq!(debouncer.poll(start + Duration::from_millis(349)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(549)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(550)), Some("acm"));
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn cancel_discards_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(1, start);
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + DELAY), None);
    }

    #[test]
    fn separate_bursts_fire_separately() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule("x", start);
        assert_eq!(debouncer.poll(start + DELAY), Some("x"));
        debouncer.schedule("xy", start + Duration::from_secs(1));
        assert_eq!(debouncer.poll(start + Duration::from_millis(1300)), Some("xy"));
    }
}
