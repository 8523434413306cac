use dmstream_core::{board::Board, sleep::Sleep};
use dmstream_driver::{
    error::{ChannelKind, DmError},
    telemetry::FlushMode,
};

use super::Controller;
use crate::channel::{ActuatorChannel, TelemetryChannel};

/// The actuator half of a split [`Controller`].
pub struct ActuatorSender<'a, B: Board> {
    board: B,
    channel: &'a mut Option<ActuatorChannel>,
}

impl<B: Board> ActuatorSender<'_, B> {
    /// Same as [`Controller::send_actuator_command`].
    pub fn send(&mut self, command: &mut [f64]) -> Result<(), DmError> {
        self.channel
            .as_mut()
            .ok_or(DmError::NotInitialized(ChannelKind::Actuator))?
            .send(&mut self.board, command)
    }
}

/// The telemetry half of a split [`Controller`].
pub struct TelemetrySender<'a, B: Board, S: Sleep> {
    board: &'a mut B,
    sleeper: &'a S,
    channel: &'a mut Option<TelemetryChannel>,
}

impl<B: Board, S: Sleep> TelemetrySender<'_, B, S> {
    /// Same as [`Controller::send_telemetry`].
    pub fn send(&mut self, payload: &[u8], flush: FlushMode) -> Result<(), DmError> {
        self.channel
            .as_mut()
            .ok_or(DmError::NotInitialized(ChannelKind::Telemetry))?
            .send(&mut *self.board, self.sleeper, payload, flush)
    }
}

impl<B: Board + Clone, S: Sleep> Controller<B, S> {
    /// Splits the controller into one sender per channel so that each can be driven from its
    /// own thread without a lock around the whole controller.
    ///
    /// The actuator sender gets a clone of the board, which must be another handle to the same
    /// device. A blocked telemetry handshake then holds the board only for single driver calls and
    /// never delays an actuator send.
    pub fn split(&mut self) -> (ActuatorSender<'_, B>, TelemetrySender<'_, B, S>) {
        (
            ActuatorSender {
                board: self.board.clone(),
                channel: &mut self.actuator,
            },
            TelemetrySender {
                board: &mut self.board,
                sleeper: &self.option.sleeper,
                channel: &mut self.telemetry,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_channels() -> anyhow::Result<()> {
        let mut dm = Controller::open(dmstream_emulator::SharedBoard::default())?;
        let (mut actuator, mut telemetry) = dm.split();
        assert_eq!(
            Err(DmError::NotInitialized(ChannelKind::Actuator)),
            actuator.send(&mut [0.0; 97])
        );
        assert_eq!(
            Err(DmError::NotInitialized(ChannelKind::Telemetry)),
            telemetry.send(&[], FlushMode::Pad)
        );
        Ok(())
    }
}
