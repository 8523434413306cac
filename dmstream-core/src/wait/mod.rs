use std::time::Duration;

use crate::sleep::Sleep;

/// Interval and timeout of a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOption {
    /// The duration slept between two checks.
    pub interval: Duration,
    /// The total sleep budget before giving up.
    pub timeout: Duration,
}

impl PollOption {
    /// Polls every 100 µs for at most one second.
    pub const DEFAULT: Self = Self {
        interval: Duration::from_micros(100),
        timeout: Duration::from_secs(1),
    };

    /// Number of sleeps allowed before timing out. A zero interval checks exactly once.
    #[must_use]
    pub fn max_attempts(&self) -> u64 {
        if self.interval.is_zero() {
            return 0;
        }
        (self.timeout.as_nanos() / self.interval.as_nanos()).min(u64::MAX as u128) as u64
    }
}

impl Default for PollOption {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Checks `ready` until it returns `true`, sleeping [`PollOption::interval`] between checks.
///
/// Returns `Ok(false)` when the budget is exhausted. The time budget is counted in sleeps, not
/// wall-clock time, so a virtual sleeper makes the loop deterministic.
pub fn poll_until<S, E, F>(sleeper: &S, option: &PollOption, mut ready: F) -> Result<bool, E>
where
    S: Sleep + ?Sized,
    F: FnMut() -> Result<bool, E>,
{
    let max_attempts = option.max_attempts();
    let mut attempts = 0;
    loop {
        if ready()? {
            return Ok(true);
        }
        if attempts >= max_attempts {
            tracing::trace!("poll gave up after {} attempts", attempts);
            return Ok(false);
        }
        sleeper.sleep(option.interval);
        attempts += 1;
    }
}
