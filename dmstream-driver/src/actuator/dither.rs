#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether sub-step fractions are dithered across the frames of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DitherMode {
    /// Every frame of a block carries the same code.
    #[default]
    Disabled,
    /// Frames toggle between adjacent codes according to [`dither_bit`].
    Enabled,
}

impl DitherMode {
    /// The code offset of frame `frame_index` for a sub-step `fraction`.
    #[must_use]
    pub fn bit(self, frame_index: usize, fraction: f64) -> u16 {
        match self {
            DitherMode::Disabled => 0,
            DitherMode::Enabled => dither_bit(frame_index, fraction),
        }
    }
}

/// Selects the dither bit of frame `frame_index` so that the average over a period
/// approximates `fraction` of one code step.
///
/// Fractions of exactly `0` or `1` never dither. A fraction that yields a zero period
/// contributes nothing.
#[must_use]
pub fn dither_bit(frame_index: usize, fraction: f64) -> u16 {
    if fraction == 0.0 || fraction == 1.0 {
        return 0;
    }
    let (on, off, fraction) = if (0.5..1.0).contains(&fraction) {
        (0, 1, 1.0 - fraction)
    } else {
        (1, 0, fraction)
    };

    // saturating cast
    let period = (1.0 / fraction) as i16;
    if period == 0 {
        return 0;
    }
    if (frame_index as i64 + 1) % i64::from(period) == 0 {
        on
    } else {
        off
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[rstest::rstest]
    #[test]
    #[case(0.0)]
    #[case(1.0)]
    #[case(f64::NAN)]
    #[case(1.5)]
    fn no_dither(#[case] fraction: f64) {
        (0..16).for_each(|i| assert_eq!(0, dither_bit(i, fraction)));
    }

    #[rstest::rstest]
    #[test]
    #[case(0.25, 4)]
    #[case(0.75, 4)]
    #[case(0.5, 2)]
    #[case(0.125, 8)]
    #[case(0.875, 8)]
    fn average(#[case] fraction: f64, #[case] period: usize) {
        let sum = (0..period)
            .map(|i| dither_bit(i, fraction) as f64)
            .sum::<f64>();
        assert_abs_diff_eq!(fraction, sum / period as f64, epsilon = 1e-12);
    }

    #[test]
    fn tiny_fraction_saturates_period() {
        assert_eq!(0, dither_bit(0, 1e-9));
        assert_eq!(1, dither_bit(i16::MAX as usize - 1, 1e-9));
    }

    #[test]
    fn disabled() {
        (0..8).for_each(|i| {
            assert_eq!(0, DitherMode::Disabled.bit(i, 0.25));
            assert_eq!(dither_bit(i, 0.25), DitherMode::Enabled.bit(i, 0.25));
        });
    }
}
