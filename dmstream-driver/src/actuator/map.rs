use itertools::Itertools;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::DmError;

use super::FrameProtocol;

/// A channel that is not commanded directly but follows a weighted sum of regular actuators.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HiddenActuator {
    /// Channel slot of the actuator.
    pub channel: usize,
    /// Driver gain of the actuator.
    pub multiplier: f64,
    /// Regular actuators it is slaved to.
    pub sources: [usize; 2],
    /// Weight of each source.
    pub weight: f64,
}

impl HiddenActuator {
    /// Command derived from the regular command vector.
    #[must_use]
    pub fn command(&self, command: &[f64]) -> f64 {
        self.sources.iter().map(|&s| self.weight * command[s]).sum()
    }
}

/// Wiring of actuators to frame channels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActuatorMap {
    /// Channel slot of each regular actuator.
    pub channels: Vec<usize>,
    /// Driver gain of each regular actuator.
    pub multipliers: Vec<f64>,
    /// Slaved actuators on the rim of the mirror.
    pub hidden: Vec<HiddenActuator>,
}

impl ActuatorMap {
    const DM97_SLAVES: [[usize; 2]; 12] = [
        [0, 5],
        [5, 12],
        [12, 21],
        [65, 76],
        [76, 85],
        [85, 92],
        [96, 91],
        [91, 84],
        [84, 75],
        [31, 20],
        [20, 11],
        [11, 4],
    ];

    /// 97 regular actuators on channels `0..97` and 12 hidden ones on `97..109`, unit gains.
    #[must_use]
    pub fn dm97() -> Self {
        const NUM_ACT: usize = 97;
        Self {
            channels: (0..NUM_ACT).collect(),
            multipliers: vec![1.0; NUM_ACT],
            hidden: Self::DM97_SLAVES
                .iter()
                .enumerate()
                .map(|(i, &sources)| HiddenActuator {
                    channel: NUM_ACT + i,
                    multiplier: 1.0,
                    sources,
                    weight: 0.3,
                })
                .collect(),
        }
    }

    /// Number of regular actuators, i.e. the length of a command vector.
    #[must_use]
    pub fn num_actuators(&self) -> usize {
        self.channels.len()
    }

    /// Number of hidden actuators.
    #[must_use]
    pub fn num_hidden(&self) -> usize {
        self.hidden.len()
    }

    /// Checks that every actuator has a gain, owns a distinct channel that fits in a frame and
    /// that hidden actuators only reference regular ones.
    pub fn validate(&self, protocol: &FrameProtocol) -> Result<(), DmError> {
        if self.channels.len() != self.multipliers.len() {
            return Err(DmError::InvalidActuatorMap(format!(
                "{} channels but {} multipliers",
                self.channels.len(),
                self.multipliers.len()
            )));
        }
        let all_channels = || {
            self.channels
                .iter()
                .copied()
                .chain(self.hidden.iter().map(|h| h.channel))
        };
        if let Some(ch) = all_channels().find(|&ch| ch >= protocol.num_channels) {
            return Err(DmError::InvalidActuatorMap(format!(
                "channel {} is out of range (< {})",
                ch, protocol.num_channels
            )));
        }
        if !all_channels().all_unique() {
            return Err(DmError::InvalidActuatorMap(
                "channels are not unique".to_string(),
            ));
        }
        if let Some(h) = self
            .hidden
            .iter()
            .find(|h| h.sources.iter().any(|&s| s >= self.num_actuators()))
        {
            return Err(DmError::InvalidActuatorMap(format!(
                "hidden actuator on channel {} references {:?}",
                h.channel, h.sources
            )));
        }
        Ok(())
    }
}

impl Default for ActuatorMap {
    fn default() -> Self {
        Self::dm97()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn dm97() -> anyhow::Result<()> {
        let map = ActuatorMap::dm97();
        assert_eq!(97, map.num_actuators());
        assert_eq!(12, map.num_hidden());
        map.validate(&FrameProtocol::DEFAULT)?;
        Ok(())
    }

    #[test]
    fn hidden_command() {
        let map = ActuatorMap::dm97();
        let mut command = vec![0.0; 97];
        command[96] = 0.5;
        command[91] = -0.2;
        assert_abs_diff_eq!(0.3 * 0.5 - 0.3 * 0.2, map.hidden[6].command(&command));
        assert_abs_diff_eq!(-0.3 * 0.2, map.hidden[7].command(&command));
        assert_abs_diff_eq!(0.0, map.hidden[0].command(&command));
    }

    #[rstest::rstest]
    #[test]
    #[case(|m: &mut ActuatorMap| { m.multipliers.pop(); })]
    #[case(|m: &mut ActuatorMap| m.channels[3] = 128)]
    #[case(|m: &mut ActuatorMap| m.channels[3] = 4)]
    #[case(|m: &mut ActuatorMap| m.hidden[0].channel = 0)]
    #[case(|m: &mut ActuatorMap| m.hidden[0].sources[1] = 97)]
    fn validate_err(#[case] f: fn(&mut ActuatorMap)) {
        let mut map = ActuatorMap::dm97();
        f(&mut map);
        assert!(matches!(
            map.validate(&FrameProtocol::DEFAULT),
            Err(DmError::InvalidActuatorMap(_))
        ));
    }
}
