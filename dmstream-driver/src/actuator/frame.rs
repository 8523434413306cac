use crate::error::DmError;

use super::{ActuatorMap, DitherMode, FrameProtocol};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Quantized {
    channel: usize,
    code: i32,
    fraction: f64,
}

fn quantize(protocol: &FrameProtocol, channel: usize, multiplier: f64, command: f64) -> Quantized {
    let step = protocol.min_analog_step;
    let dev = multiplier * command;
    Quantized {
        channel,
        // saturating cast
        code: ((dev + 1.0) * protocol.code_mid as f64).round() as i32,
        fraction: (dev % step) / step + if dev <= 0.0 { 1.0 } else { 0.0 },
    }
}

fn fold(mut sum: u32) -> u8 {
    while sum > 0xFF {
        sum = sum.to_le_bytes().iter().map(|&b| b as u32).sum();
    }
    sum as u8
}

/// One's-complement checksum of `words`: the end-around-carry byte sum, inverted.
#[must_use]
pub fn checksum(words: &[u16]) -> u8 {
    !fold(words.iter().map(|&w| w as u32).sum())
}

/// Checks the framing words and the checksum of a single frame.
#[must_use]
pub fn verify_frame(protocol: &FrameProtocol, frame: &[u16]) -> bool {
    if frame.len() < protocol.data_length() {
        return false;
    }
    let end = protocol.end_offset();
    let check = frame[end].wrapping_sub(protocol.end_word);
    if frame[0] != protocol.start_word
        || frame[1] != protocol.init_counter
        || frame[protocol.frame_end_offset()] != protocol.frame_end
        || check > 0xFF
    {
        return false;
    }
    let sum = frame[1..end].iter().map(|&w| w as u32).sum::<u32>()
        + protocol.end_word as u32
        + check as u32;
    fold(sum) == 0xFF
}

/// Encodes conditioned command vectors into blocks of device frames.
///
/// Scratch space for the hidden commands and quantized codes is allocated once in
/// [`FrameEncoder::new`], so [`FrameEncoder::encode`] never allocates.
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    protocol: FrameProtocol,
    map: ActuatorMap,
    dither: DitherMode,
    quantized: Vec<Quantized>,
}

impl FrameEncoder {
    /// Creates a new [`FrameEncoder`].
    pub fn new(
        protocol: FrameProtocol,
        map: ActuatorMap,
        dither: DitherMode,
    ) -> Result<Self, DmError> {
        protocol.validate()?;
        map.validate(&protocol)?;
        let quantized = vec![Quantized::default(); map.num_actuators() + map.num_hidden()];
        Ok(Self {
            protocol,
            map,
            dither,
            quantized,
        })
    }

    /// The frame layout.
    #[must_use]
    pub const fn protocol(&self) -> &FrameProtocol {
        &self.protocol
    }

    /// The actuator wiring.
    #[must_use]
    pub const fn map(&self) -> &ActuatorMap {
        &self.map
    }

    /// The dither mode.
    #[must_use]
    pub const fn dither(&self) -> DitherMode {
        self.dither
    }

    /// Length of a command vector.
    #[must_use]
    pub fn num_actuators(&self) -> usize {
        self.map.num_actuators()
    }

    /// Writes `dithers` frames built from `command` to the head of `buffer`.
    pub fn encode(
        &mut self,
        command: &[f64],
        dithers: usize,
        buffer: &mut [u16],
    ) -> Result<(), DmError> {
        if command.len() != self.num_actuators() {
            return Err(DmError::CommandLength(command.len(), self.num_actuators()));
        }
        let data_length = self.protocol.data_length();
        if buffer.len() < dithers * data_length {
            return Err(DmError::BufferTooSmall(dithers * data_length, buffer.len()));
        }

        let protocol = &self.protocol;
        let regular = self
            .map
            .channels
            .iter()
            .zip(self.map.multipliers.iter())
            .zip(command.iter())
            .map(|((&ch, &m), &c)| quantize(protocol, ch, m, c));
        let hidden = self
            .map
            .hidden
            .iter()
            .map(|h| quantize(protocol, h.channel, h.multiplier, h.command(command)));
        self.quantized
            .iter_mut()
            .zip(regular.chain(hidden))
            .for_each(|(dst, q)| *dst = q);

        let p = &self.protocol;
        let code_min = p.code_min as i32;
        let code_max = p.code_max as i32;
        buffer
            .chunks_exact_mut(data_length)
            .take(dithers)
            .enumerate()
            .for_each(|(f, frame)| {
                frame.fill(0);
                frame[0] = p.start_word;
                frame[1] = p.init_counter;
                self.quantized.iter().for_each(|q| {
                    let code = q.code.saturating_add(self.dither.bit(f, q.fraction) as i32);
                    frame[p.header_length + q.channel] = code.clamp(code_min, code_max) as u16;
                });
                let end = p.end_offset();
                frame[end] = p.end_word;
                frame[end] = frame[end].wrapping_add(checksum(&frame[1..=end]) as u16);
                frame[p.frame_end_offset()] = p.frame_end;
            });

        tracing::trace!("encoded {} frame(s)", dithers);
        Ok(())
    }
}
