use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use dmstream_core::sleep::Sleep;

/// A sleeper that only accumulates the requested durations.
///
/// Clones share the same clock, so a test can keep one handle and give the other to a
/// controller.
#[derive(Debug, Clone, Default)]
pub struct VirtualSleeper {
    elapsed: Arc<AtomicU64>,
    count: Arc<AtomicU64>,
}

impl VirtualSleeper {
    /// Creates a sleeper with zero elapsed time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time slept so far.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed.load(Ordering::Relaxed))
    }

    /// Number of sleeps so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Sleep for VirtualSleeper {
    fn sleep(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_clock() {
        let sleeper = VirtualSleeper::new();
        let handle = sleeper.clone();
        sleeper.sleep(Duration::from_micros(100));
        sleeper.sleep(Duration::from_micros(500));
        assert_eq!(Duration::from_micros(600), handle.elapsed());
        assert_eq!(2, handle.count());
    }
}
