use std::time::{Duration, Instant};

/// Holds the latest value until it has been quiet for the configured period.
#[derive(Clone, Debug)]
pub(super) struct Debouncer {
    quiet: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub(super) fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the quiet period.
    pub(super) fn push(&mut self, value: String, now: Instant) {
        self.pending = Some((value, now + self.quiet));
    }

    /// Releases the pending value once its quiet period has elapsed.
    pub(super) fn settle(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub(super) fn cancel(&mut self) {
        self.pending = None;
    }

    pub(super) fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_last_value_settles() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.push("p".to_owned(), start);
        debouncer.push("pe".to_owned(), start + Duration::from_millis(100));
        debouncer.push("pen".to_owned(), start + Duration::from_millis(250));

        assert_eq!(debouncer.settle(start + Duration::from_millis(400)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(550))
        );
        assert_eq!(
            debouncer.settle(start + Duration::from_millis(550)).as_deref(),
            Some("pen")
        );
        assert_eq!(debouncer.settle(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn cancel_drops_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.push("vesting".to_owned(), start);
        debouncer.cancel();
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.settle(start + Duration::from_secs(1)), None);
    }
}
