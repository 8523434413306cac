use std::{fmt::Debug, time::Duration};

use dmstream_core::{
    board::Board,
    sleep::{Sleep, StdSleeper},
    wait::PollOption,
};
use dmstream_driver::{
    actuator::{ActuatorMap, CommandLimits, DitherMode, FrameEncoder, FrameProtocol},
    error::{ChannelKind, DmError},
    telemetry::{FlushMode, TelemetryLayout},
};
use getset::{Getters, MutGetters};

use crate::channel::{ActuatorChannel, TelemetryChannel};

mod split;

pub use split::{ActuatorSender, TelemetrySender};

/// The option of the actuator channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorOption {
    /// Frame layout of the drive electronics.
    pub protocol: FrameProtocol,
    /// Wiring of actuators to frame channels.
    pub map: ActuatorMap,
    /// Amplitude and power limits applied before encoding.
    pub limits: CommandLimits,
    /// Sub-LSB dithering across the frames of a block.
    pub dither: DitherMode,
    /// Divisor of the programmable clock that paces the frame output.
    pub clock_divisor: u32,
}

impl Default for ActuatorOption {
    fn default() -> Self {
        Self {
            protocol: FrameProtocol::DEFAULT,
            map: ActuatorMap::dm97(),
            limits: CommandLimits::DEFAULT,
            dither: DitherMode::Disabled,
            clock_divisor: 25,
        }
    }
}

/// The option of the telemetry channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryOption {
    /// Reserved region and sentinel codes of the buffer.
    pub layout: TelemetryLayout,
    /// Polling policy of the transfer handshake.
    pub poll: PollOption,
    /// Time slept between DMA completion and the next write.
    pub settle: Duration,
}

impl Default for TelemetryOption {
    fn default() -> Self {
        Self {
            layout: TelemetryLayout::DEFAULT,
            poll: PollOption::DEFAULT,
            settle: Duration::from_micros(500),
        }
    }
}

/// The option of [`Controller`].
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOption<S: Debug> {
    /// The option of the actuator channel.
    pub actuator: ActuatorOption,
    /// The option of the telemetry channel.
    pub telemetry: TelemetryOption,
    /// The sleeper used by blocking handshakes.
    pub sleeper: S,
}

impl<S: Default + Debug> Default for ControllerOption<S> {
    fn default() -> Self {
        Self {
            actuator: ActuatorOption::default(),
            telemetry: TelemetryOption::default(),
            sleeper: S::default(),
        }
    }
}

/// A controller for a deformable mirror and its telemetry stream.
///
/// Owns the board and both channels. Dropping an open controller closes the board.
#[derive(Getters, MutGetters)]
pub struct Controller<B: Board, S: Sleep = StdSleeper> {
    /// The board.
    #[getset(get = "pub", get_mut = "pub")]
    board: B,
    /// The option this controller was opened with.
    #[getset(get = "pub")]
    option: ControllerOption<S>,
    /// The actuator channel, if initialized.
    #[getset(get = "pub")]
    actuator: Option<ActuatorChannel>,
    /// The telemetry channel, if initialized.
    #[getset(get = "pub")]
    telemetry: Option<TelemetryChannel>,
}

impl<B: Board> Controller<B> {
    /// Equivalent to [`Self::open_with_option`] with default [`ControllerOption`].
    pub fn open(board: B) -> Result<Self, DmError> {
        Self::open_with_option(board, ControllerOption::default())
    }
}

impl<B: Board, S: Sleep> Controller<B, S> {
    /// Opens a controller with a [`ControllerOption`]. The board is reset.
    #[tracing::instrument(level = "debug", skip(board))]
    pub fn open_with_option(mut board: B, option: ControllerOption<S>) -> Result<Self, DmError> {
        board.reset()?;
        Ok(Self {
            board,
            option,
            actuator: None,
            telemetry: None,
        })
    }

    /// Sets up the actuator channel for blocks of `dithers` frames.
    ///
    /// A previously initialized actuator channel is torn down first; if that fails, the channel
    /// stays uninitialized and the error is returned.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn init_actuator_channel(&mut self, dithers: usize) -> Result<(), DmError> {
        if dithers == 0 {
            return Err(DmError::InvalidDithers(dithers));
        }
        let option = &self.option.actuator;
        let encoder = FrameEncoder::new(option.protocol, option.map.clone(), option.dither)?;

        self.cleanup_actuator_channel()?;
        self.actuator = Some(ActuatorChannel::init(
            &mut self.board,
            &self.option.actuator,
            encoder,
            dithers,
        )?);
        Ok(())
    }

    /// Sets up the telemetry channel with a DMA buffer of `bytes` bytes.
    ///
    /// A previously initialized telemetry channel is torn down first; if that fails, the
    /// channel stays uninitialized and the error is returned.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn init_telemetry_channel(&mut self, bytes: u32) -> Result<(), DmError> {
        TelemetryChannel::check_size(&self.option.telemetry.layout, bytes)?;

        self.cleanup_telemetry_channel()?;
        self.telemetry = Some(TelemetryChannel::init(
            &mut self.board,
            &self.option.telemetry,
            bytes,
        )?);
        Ok(())
    }

    /// Conditions `command` in place and starts its output. Never blocks.
    ///
    /// Returns [`DmError::DmaNotDone`] or [`DmError::FifoNotEmpty`] if the previous block is
    /// still being output; the caller may retry with the next command.
    pub fn send_actuator_command(&mut self, command: &mut [f64]) -> Result<(), DmError> {
        self.actuator
            .as_mut()
            .ok_or(DmError::NotInitialized(ChannelKind::Actuator))?
            .send(&mut self.board, command)
    }

    /// Appends `payload` to the telemetry stream.
    ///
    /// Blocks while a full buffer is handed to the hardware, for at most the poll timeout per
    /// handshake.
    pub fn send_telemetry(&mut self, payload: &[u8], flush: FlushMode) -> Result<(), DmError> {
        self.telemetry
            .as_mut()
            .ok_or(DmError::NotInitialized(ChannelKind::Telemetry))?
            .send(&mut self.board, &self.option.sleeper, payload, flush)
    }

    /// Stops the actuator output and releases its buffer.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn cleanup_actuator_channel(&mut self) -> Result<(), DmError> {
        match self.actuator.take() {
            Some(channel) => channel.cleanup(&mut self.board),
            None => ActuatorChannel::release(&mut self.board, None),
        }
    }

    /// Stops the telemetry output and releases its buffer.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn cleanup_telemetry_channel(&mut self) -> Result<(), DmError> {
        match self.telemetry.take() {
            Some(channel) => channel.cleanup(&mut self.board),
            None => TelemetryChannel::release(&mut self.board, None),
        }
    }

    /// Closes the controller.
    ///
    /// Both channels are torn down and the board is closed even if an earlier step fails. The
    /// first error is returned.
    pub fn close(mut self) -> Result<(), DmError> {
        self.close_impl()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn close_impl(&mut self) -> Result<(), DmError> {
        if !self.board.is_open() {
            return Ok(());
        }
        let actuator = self.cleanup_actuator_channel();
        let telemetry = self.cleanup_telemetry_channel();
        let board = self.board.close().map_err(DmError::from);
        actuator.and(telemetry).and(board)
    }
}

impl<B: Board, S: Sleep> Drop for Controller<B, S> {
    fn drop(&mut self) {
        if !self.board.is_open() {
            return;
        }
        let _ = self.close_impl();
    }
}
