#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Amplitude and power limits applied to every command vector before encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommandLimits {
    /// Lower bound of a single actuator command.
    pub min: f64,
    /// Upper bound of a single actuator command.
    pub max: f64,
    /// Upper bound of the sum of squared commands.
    pub max_power: f64,
}

impl CommandLimits {
    /// Limits of the 97-actuator mirror.
    pub const DEFAULT: Self = Self {
        min: -1.0,
        max: 1.0,
        max_power: 5.0,
    };

    /// Clamps every element into `[min, max]`. `NaN` elements become `0.0`.
    pub fn clamp_amplitude(&self, command: &mut [f64]) {
        command.iter_mut().for_each(|v| {
            *v = if v.is_nan() {
                0.0
            } else if *v > self.max {
                self.max
            } else if *v < self.min {
                self.min
            } else {
                *v
            };
        });
    }

    /// Scales the vector so that its total power does not exceed `max_power`.
    ///
    /// Returns the applied gain.
    pub fn limit_power(&self, command: &mut [f64]) -> f64 {
        let power = command.iter().map(|v| v * v).sum::<f64>();
        if power <= self.max_power {
            return 1.0;
        }
        let gain = (self.max_power / power).sqrt();
        command.iter_mut().for_each(|v| *v *= gain);
        tracing::trace!("command power {} limited with gain {}", power, gain);
        gain
    }

    /// Applies [`clamp_amplitude`] then [`limit_power`].
    ///
    /// [`clamp_amplitude`]: Self::clamp_amplitude
    /// [`limit_power`]: Self::limit_power
    pub fn apply(&self, command: &mut [f64]) {
        self.clamp_amplitude(command);
        self.limit_power(command);
    }
}

impl Default for CommandLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}
