#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::DmError;

/// Smallest actuator DMA buffer, in words.
pub const MIN_BUFFER_WORDS: usize = 0x200;

/// Binary layout of one device frame.
///
/// ```text
/// | start | counter | channel 0 .. channel N-1 | end+checksum | pad .. | frame end |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameProtocol {
    /// First word of every frame.
    pub start_word: u16,
    /// Second word of every frame.
    pub init_counter: u16,
    /// Trailer word; the checksum is added to it.
    pub end_word: u16,
    /// Marker written after the padding.
    pub frame_end: u16,
    /// Number of words before channel 0.
    pub header_length: usize,
    /// Number of channel slots in a frame.
    pub num_channels: usize,
    /// Distance from the end word to the frame-end marker.
    pub pad_length: usize,
    /// Lowest code a channel may carry.
    pub code_min: u16,
    /// Code of a zero command.
    pub code_mid: u16,
    /// Highest code a channel may carry.
    pub code_max: u16,
    /// Command change that corresponds to one code step.
    pub min_analog_step: f64,
}

impl FrameProtocol {
    /// 14-bit drive electronics with 128 channels.
    pub const DEFAULT: Self = Self {
        start_word: 0xF800,
        init_counter: 0x5C00,
        end_word: 0xBC00,
        frame_end: 0xFFFF,
        header_length: 2,
        num_channels: 128,
        pad_length: 4,
        code_min: 0x0000,
        code_mid: 0x2000,
        code_max: 0x3FFF,
        min_analog_step: 1.0 / 8192.0,
    };

    /// Offset of the end word within a frame.
    #[must_use]
    pub const fn end_offset(&self) -> usize {
        self.header_length + self.num_channels
    }

    /// Offset of the frame-end marker within a frame.
    #[must_use]
    pub const fn frame_end_offset(&self) -> usize {
        self.end_offset() + self.pad_length
    }

    /// Number of words occupied by one frame in the DMA buffer.
    #[must_use]
    pub const fn data_length(&self) -> usize {
        self.frame_end_offset() + 1
    }

    /// Number of words of the DMA buffer that holds a block of `dithers` frames.
    #[must_use]
    pub const fn buffer_words(&self, dithers: usize) -> usize {
        let words = dithers * self.data_length();
        if dithers < 3 && words < MIN_BUFFER_WORDS {
            MIN_BUFFER_WORDS
        } else {
            words
        }
    }

    /// Checks that the header fits the start word and counter, that the frame-end marker follows
    /// the end word and that the code range is ordered.
    pub fn validate(&self) -> Result<(), DmError> {
        if self.header_length < 2 {
            return Err(DmError::InvalidFrameProtocol(format!(
                "header length ({}) must be at least 2",
                self.header_length
            )));
        }
        if self.pad_length == 0 {
            return Err(DmError::InvalidFrameProtocol(
                "pad length must be at least 1".to_string(),
            ));
        }
        if !(self.code_min <= self.code_mid && self.code_mid <= self.code_max) {
            return Err(DmError::InvalidFrameProtocol(format!(
                "codes must satisfy {:#06X} <= {:#06X} <= {:#06X}",
                self.code_min, self.code_mid, self.code_max
            )));
        }
        if !(self.min_analog_step > 0.0) {
            return Err(DmError::InvalidFrameProtocol(format!(
                "minimum analog step ({}) must be positive",
                self.min_analog_step
            )));
        }
        Ok(())
    }
}

impl Default for FrameProtocol {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let p = FrameProtocol::DEFAULT;
        assert_eq!(130, p.end_offset());
        assert_eq!(134, p.frame_end_offset());
        assert_eq!(135, p.data_length());
    }

    #[rstest::rstest]
    #[test]
    #[case(|p: &mut FrameProtocol| p.header_length = 1)]
    #[case(|p: &mut FrameProtocol| p.pad_length = 0)]
    #[case(|p: &mut FrameProtocol| p.code_min = 0x3000)]
    #[case(|p: &mut FrameProtocol| p.code_max = 0x1000)]
    #[case(|p: &mut FrameProtocol| p.min_analog_step = 0.0)]
    #[case(|p: &mut FrameProtocol| p.min_analog_step = f64::NAN)]
    fn validate_err(#[case] f: fn(&mut FrameProtocol)) {
        let mut p = FrameProtocol::DEFAULT;
        assert_eq!(Ok(()), p.validate());
        f(&mut p);
        assert!(matches!(p.validate(), Err(DmError::InvalidFrameProtocol(_))));
    }

    #[rstest::rstest]
    #[test]
    #[case(0x200, 1)]
    #[case(0x200, 2)]
    #[case(405, 3)]
    #[case(1350, 10)]
    fn buffer_words(#[case] expect: usize, #[case] dithers: usize) {
        assert_eq!(expect, FrameProtocol::DEFAULT.buffer_words(dithers));
    }
}
