use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Start of the simulated broadcast, shared by every request.
///
/// The first media playlist request starts the stream; every later request
/// sees the same start until [`StreamClock::reset`] is called.
#[derive(Debug, Default)]
pub struct StreamClock {
    start: Mutex<Option<Instant>>,
}

impl StreamClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Instant>> {
        self.start.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seconds of stream time at `now`, starting the stream if needed.
    ///
    /// A freshly started stream is already `initial` old, so the first
    /// playlist has content to show.
    pub fn elapsed_at(&self, now: Instant, initial: Duration) -> f64 {
        let start = *self.lock().get_or_insert_with(|| {
            tracing::debug!(initial_secs = initial.as_secs_f64(), "stream started");
            now
        });
        (now.saturating_duration_since(start) + initial).as_secs_f64()
    }

    /// Stream time without starting the stream.
    pub fn peek(&self, initial: Duration) -> Option<f64> {
        let start = *self.lock();
        start.map(|start| (Instant::now().saturating_duration_since(start) + initial).as_secs_f64())
    }

    pub fn is_started(&self) -> bool {
        self.lock().is_some()
    }

    pub fn reset(&self) {
        *self.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_request_starts_stream() {
        let clock = StreamClock::new();
        let t0 = Instant::now();
        let initial = Duration::from_secs(20);

        assert!(!clock.is_started());
        assert_eq!(clock.peek(initial), None);
        assert_eq!(clock.elapsed_at(t0, initial), 20.0);
        assert!(clock.is_started());
        assert_eq!(clock.elapsed_at(t0 + Duration::from_millis(4500), initial), 24.5);
    }

    #[test]
    fn test_reset_restarts_stream() {
        let clock = StreamClock::new();
        let t0 = Instant::now();
        let initial = Duration::from_secs(10);

        clock.elapsed_at(t0, initial);
        clock.reset();
        assert!(!clock.is_started());

        let t1 = t0 + Duration::from_secs(100);
        assert_eq!(clock.elapsed_at(t1, initial), 10.0);
    }

    #[test]
    fn test_never_negative_for_earlier_instant() {
        let clock = StreamClock::new();
        let t0 = Instant::now() + Duration::from_secs(5);
        clock.elapsed_at(t0, Duration::ZERO);

        assert_eq!(clock.elapsed_at(Instant::now(), Duration::ZERO), 0.0);
    }

    #[test]
    fn test_concurrent_first_requests_share_start() {
        let clock = Arc::new(StreamClock::new());
        let base = Instant::now();

        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                let clock = Arc::clone(&clock);
                std::thread::spawn(move || {
                    clock.elapsed_at(base + Duration::from_secs(i), Duration::ZERO);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let later = base + Duration::from_secs(100);
        let elapsed = clock.elapsed_at(later, Duration::ZERO);
        // exactly one thread set the start, whichever it was
        assert!((93.0..=100.0).contains(&elapsed));
        assert_eq!(elapsed.fract(), 0.0);
        assert_eq!(clock.elapsed_at(later, Duration::ZERO), elapsed);
    }
}
