use std::time::Duration;

pub use spin_sleep::SpinSleeper;

/// Waits between the checks of a polling loop.
pub trait Sleep: std::fmt::Debug {
    /// Blocks the current thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Sleeps with [`std::thread::sleep`]. Coarse, but does not burn a core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StdSleeper;

impl Sleep for StdSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl Sleep for SpinSleeper {
    fn sleep(&self, duration: Duration) {
        SpinSleeper::sleep(*self, duration);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[rstest::rstest]
    #[test]
    #[case(StdSleeper, Duration::from_millis(5))]
    #[case(SpinSleeper::default(), Duration::from_micros(500))]
    fn reaches_deadline(#[case] sleeper: impl Sleep, #[case] duration: Duration) {
        let start = Instant::now();
        sleeper.sleep(duration);
        assert!(duration <= start.elapsed());
    }

    #[test]
    fn zero_duration_returns() {
        let start = Instant::now();
        StdSleeper.sleep(Duration::ZERO);
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
