use std::time::{Duration, Instant};

/// Collapses bursts of writes into one: each `push` replaces the pending value
/// and restarts the quiet period.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, due)| due.saturating_duration_since(now))
    }

    pub fn take_if_due(&mut self, now: Instant) -> Option<T> {
        let due = self.pending.as_ref().is_some_and(|(_, due)| *due <= now);
        if due {
            self.take()
        } else {
            None
        }
    }

    pub fn take(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapid_pushes_collapse_into_latest_value() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(1000));
        d.push("a", t0);
        d.push("ab", t0 + Duration::from_millis(400));
        d.push("abc", t0 + Duration::from_millis(800));
        assert_eq!(d.take_if_due(t0 + Duration::from_millis(1500)), None);
        assert_eq!(
            d.time_until_due(t0 + Duration::from_millis(1500)),
            Some(Duration::from_millis(300))
        );
        assert_eq!(d.take_if_due(t0 + Duration::from_millis(1800)), Some("abc"));
        assert!(!d.is_pending());
    }

    #[test]
    fn take_flushes_early() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_secs(60));
        assert_eq!(d.take(), None);
        d.push(1, t0);
        assert_eq!(d.take(), Some(1));
        assert_eq!(d.time_until_due(t0), None);
    }
}
