use std::thread;
use std::time::{Duration, Instant};

/// Time source for the sampling path and for paced loops.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Sleep until `deadline`. Returns `false`, without sleeping, when the
    /// deadline has already passed.
    fn sleep_until(&self, deadline: Instant) -> bool {
        let now = self.now();
        if deadline <= now {
            return false;
        }
        self.sleep(deadline - now);
        true
    }
}

/// Wall-clock time from `std::time::Instant`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Manually driven clock. `sleep` advances time instead of blocking, and
    /// clones share one timeline, so a test can hand a clone to the code
    /// under test and step time from outside.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        elapsed_ns: Arc<AtomicU64>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                elapsed_ns: Arc::new(AtomicU64::new(0)),
            }
        }

        pub fn advance(&self, d: Duration) {
            let ns = u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
            let _ = self
                .elapsed_ns
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                    Some(v.saturating_add(ns))
                });
        }

        /// Jump to an absolute time since the clock was created.
        pub fn set_elapsed(&self, d: Duration) {
            let ns = u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
            self.elapsed_ns.store(ns, Ordering::Relaxed);
        }

        pub fn elapsed(&self) -> Duration {
            Duration::from_nanos(self.elapsed_ns.load(Ordering::Relaxed))
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            self.origin + self.elapsed()
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }

}
