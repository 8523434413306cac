use std::ops::RangeInclusive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placement of the reserved region and the sentinel codes of the telemetry buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TelemetryLayout {
    /// First word of the reserved region.
    pub reserved_start: usize,
    /// Last word of the reserved region (inclusive).
    pub reserved_end: usize,
    /// Code that marks a slot without data.
    pub empty_code: u16,
    /// Code written instead of payload words equal to `empty_code`.
    pub replace_code: u16,
}

impl TelemetryLayout {
    /// Reserved region `[256, 262]`, empty code `0xFADE`, replace code `0xFFFF`.
    pub const DEFAULT: Self = Self {
        reserved_start: 256,
        reserved_end: 262,
        empty_code: 0xFADE,
        replace_code: 0xFFFF,
    };

    /// The reserved region as a range of word indices.
    #[must_use]
    pub const fn reserved(&self) -> RangeInclusive<usize> {
        self.reserved_start..=self.reserved_end
    }

    /// Returns `true` if word `idx` belongs to the reserved region.
    #[must_use]
    pub const fn is_reserved(&self, idx: usize) -> bool {
        self.reserved_start <= idx && idx <= self.reserved_end
    }

    /// Number of payload words one buffer of `buffer_length` words carries.
    #[must_use]
    pub const fn capacity(&self, buffer_length: usize) -> usize {
        buffer_length - 1 - (self.reserved_end - self.reserved_start + 1)
    }

    /// Maps a payload word to the word written into the buffer.
    #[must_use]
    pub const fn substitute(&self, word: u16) -> u16 {
        if word == self.empty_code {
            self.replace_code
        } else {
            word
        }
    }

    /// Applies [`TelemetryLayout::substitute`] in place.
    pub fn substitute_all(&self, words: &mut [u16]) {
        words.iter_mut().for_each(|w| *w = self.substitute(*w));
    }

    /// Overwrites the reserved region with the empty code.
    pub fn scrub(&self, buffer: &mut [u16]) {
        buffer[self.reserved()].fill(self.empty_code);
    }

    /// Fills every slot outside the reserved region with an incrementing counter and
    /// seals the last slot with the empty code.
    pub fn fill_pattern(&self, buffer: &mut [u16]) {
        let mut counter = 0u16;
        buffer
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| !self.is_reserved(*i))
            .for_each(|(_, w)| {
                *w = counter;
                counter = counter.wrapping_add(1);
            });
        if let Some(last) = buffer.last_mut() {
            *last = self.empty_code;
        }
    }

    /// Checks that a buffer of `buffer_length` words holds the reserved region followed by at
    /// least one data slot before the final sentinel slot.
    pub fn validate(&self, buffer_length: usize) -> Result<(), String> {
        if self.reserved_start > self.reserved_end {
            return Err(format!(
                "reserved region [{}, {}] is empty",
                self.reserved_start, self.reserved_end
            ));
        }
        if self.reserved_end + 2 >= buffer_length {
            return Err(format!(
                "{} words cannot hold reserved region [{}, {}]",
                buffer_length, self.reserved_start, self.reserved_end
            ));
        }
        if self.empty_code == self.replace_code {
            return Err(format!(
                "empty and replace codes are both {:#06X}",
                self.empty_code
            ));
        }
        Ok(())
    }
}

impl Default for TelemetryLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute() {
        let layout = TelemetryLayout::DEFAULT;
        let mut words = vec![0x0000, 0xFADE, 0x1234, 0xFFFF, 0xFADE];
        layout.substitute_all(&mut words);
        assert_eq!(vec![0x0000, 0xFFFF, 0x1234, 0xFFFF, 0xFFFF], words);

        let once = words.clone();
        layout.substitute_all(&mut words);
        assert_eq!(once, words);
    }

    #[test]
    fn scrub() {
        let layout = TelemetryLayout::DEFAULT;
        let mut buffer = vec![0u16; 1024];
        layout.scrub(&mut buffer);
        buffer.iter().enumerate().for_each(|(i, &w)| {
            if (256..=262).contains(&i) {
                assert_eq!(0xFADE, w);
            } else {
                assert_eq!(0, w);
            }
        });
    }

    #[test]
    fn fill_pattern() {
        let layout = TelemetryLayout::DEFAULT;
        let mut buffer = vec![0u16; 1024];
        layout.scrub(&mut buffer);
        layout.fill_pattern(&mut buffer);
        assert_eq!(0, buffer[0]);
        assert_eq!(255, buffer[255]);
        assert!(buffer[256..=262].iter().all(|&w| w == 0xFADE));
        assert_eq!(256, buffer[263]);
        assert_eq!(1015, buffer[1022]);
        assert_eq!(0xFADE, buffer[1023]);
    }

    #[test]
    fn fill_pattern_wraps() {
        let layout = TelemetryLayout::DEFAULT;
        let mut buffer = vec![0u16; 0x10010];
        layout.fill_pattern(&mut buffer);
        assert_eq!(0xFFFF, buffer[0x10006]);
        assert_eq!(0x0000, buffer[0x10007]);
    }

    #[rstest::rstest]
    #[test]
    #[case(1024)]
    #[case(265)]
    fn validate_ok(#[case] len: usize) {
        assert_eq!(Ok(()), TelemetryLayout::DEFAULT.validate(len));
    }

    #[rstest::rstest]
    #[test]
    #[case(TelemetryLayout::DEFAULT, 264)]
    #[case(TelemetryLayout::DEFAULT, 0)]
    #[case(TelemetryLayout { reserved_start: 10, reserved_end: 9, ..TelemetryLayout::DEFAULT }, 1024)]
    #[case(TelemetryLayout { replace_code: 0xFADE, ..TelemetryLayout::DEFAULT }, 1024)]
    fn validate_err(#[case] layout: TelemetryLayout, #[case] len: usize) {
        assert!(layout.validate(len).is_err());
    }

    #[test]
    fn capacity() {
        assert_eq!(1016, TelemetryLayout::DEFAULT.capacity(1024));
    }
}
