//! Per-client sliding window and in-flight counter.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Request history and in-flight work of a single client.
#[derive(Debug, Default)]
pub(crate) struct ClientWindow {
    /// Admission instants, oldest first
    timestamps: VecDeque<Instant>,
    /// Admitted and not yet released
    pub(crate) in_flight: usize,
}

impl ClientWindow {
    /// Drops timestamps that fell out of the window and returns how many remain.
    ///
    /// A timestamp stays in the window while `now - ts < window`.
    pub(crate) fn prune(&mut self, now: Instant, window: Duration) -> usize {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) < window {
                break;
            }
            self.timestamps.pop_front();
        }
        self.timestamps.len()
    }

    pub(crate) fn record(&mut self, now: Instant) {
        self.timestamps.push_back(now);
    }

    /// No history in the window and nothing in flight.
    pub(crate) fn is_idle(&self) -> bool {
        self.timestamps.is_empty() && self.in_flight == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_keeps_recent() {
        let now = Instant::now();
        let window = Duration::from_millis(1000);
        let mut client = ClientWindow::default();

        client.record(now);
        client.record(now + Duration::from_millis(500));
        client.record(now + Duration::from_millis(900));

        assert_eq!(client.prune(now + Duration::from_millis(999), window), 3);
        // Exactly one window old is out
        assert_eq!(client.prune(now + Duration::from_millis(1000), window), 2);
        assert_eq!(client.prune(now + Duration::from_millis(1950), window), 0);
    }

    #[test]
    fn test_idle() {
        let now = Instant::now();
        let mut client = ClientWindow::default();
        assert!(client.is_idle());

        client.in_flight = 1;
        assert!(!client.is_idle());

        client.in_flight = 0;
        client.record(now);
        assert!(!client.is_idle());

        client.prune(now + Duration::from_secs(2), Duration::from_secs(1));
        assert!(client.is_idle());
    }
}
