use dmstream_core::board::{
    Board, ClockMode, DmaBuffer, FifoDirection, FifoStatus, Queue, TriggerSource, ENABLE_ALL,
};
use dmstream_driver::{
    actuator::{CommandLimits, FrameEncoder},
    error::DmError,
};
use getset::{CopyGetters, Getters};

use super::{setup_buffer, teardown};
use crate::controller::ActuatorOption;

/// Queue that carries actuator frames.
pub const ACTUATOR_QUEUE: Queue = Queue::Q0;

/// Output channel for deformable-mirror commands.
///
/// Sends never block. When the hardware is still busy with the previous block the send fails
/// with a retriable error and the block is dropped.
#[derive(Debug, Getters, CopyGetters)]
pub struct ActuatorChannel {
    /// Encoder of the dither blocks.
    #[getset(get = "pub")]
    encoder: FrameEncoder,
    /// Limits applied to every command.
    #[getset(get_copy = "pub")]
    limits: CommandLimits,
    /// Number of frames in a dither block.
    #[getset(get_copy = "pub")]
    dithers: usize,
    /// The DMA buffer holding the last encoded block.
    #[getset(get = "pub")]
    buffer: DmaBuffer,
    /// `true` while the "DMA not done" warning is suppressed.
    #[getset(get_copy = "pub")]
    dma_warned: bool,
    /// `true` while the "FIFO not empty" warning is suppressed.
    #[getset(get_copy = "pub")]
    fifo_warned: bool,
}

impl ActuatorChannel {
    /// Configures the clock, FIFO and DMA of [`ACTUATOR_QUEUE`] and starts the output clock.
    ///
    /// The queue must already be torn down.
    pub(crate) fn init<B: Board>(
        board: &mut B,
        option: &ActuatorOption,
        encoder: FrameEncoder,
        dithers: usize,
    ) -> Result<Self, DmError> {
        let bytes = encoder.protocol().buffer_words(dithers) * size_of::<u16>();
        tracing::debug!(
            "Initialize actuator channel: {} dithers, {} bytes",
            dithers,
            bytes
        );

        board.configure_clock(ACTUATOR_QUEUE, option.clock_divisor)?;
        board.configure_fifo(
            ACTUATOR_QUEUE,
            FifoDirection::PciToBoard,
            TriggerSource::ProgrammableClock,
        )?;
        let buffer = board.allocate_dma_buffer(bytes)?;
        let buffer = setup_buffer(board, buffer, |board, buffer| {
            board.configure_dma(ACTUATOR_QUEUE, bytes)?;
            buffer.clear();
            board.enable_fifo(ACTUATOR_QUEUE, ENABLE_ALL)?;
            board.set_clock_mode(ACTUATOR_QUEUE, ClockMode::Continuous)
        })?;

        Ok(Self {
            encoder,
            limits: option.limits,
            dithers,
            buffer,
            dma_warned: false,
            fifo_warned: false,
        })
    }

    /// Conditions `command` in place, encodes it and starts the transfer.
    pub fn send<B: Board>(&mut self, board: &mut B, command: &mut [f64]) -> Result<(), DmError> {
        let expected = self.encoder.num_actuators();
        if command.len() != expected {
            return Err(DmError::CommandLength(command.len(), expected));
        }

        self.limits.apply(command);
        self.encoder.encode(command, self.dithers, &mut self.buffer)?;

        if !board.check_dma_complete(ACTUATOR_QUEUE) {
            if !self.dma_warned {
                tracing::warn!(
                    "DMA on {} is not done (suppressing additional warnings)",
                    ACTUATOR_QUEUE
                );
                self.dma_warned = true;
            }
            return Err(DmError::DmaNotDone(ACTUATOR_QUEUE));
        }
        self.dma_warned = false;

        if !board.fifo_status(ACTUATOR_QUEUE, FifoStatus::Empty)? {
            if !self.fifo_warned {
                tracing::warn!(
                    "{} is not empty (suppressing additional warnings)",
                    ACTUATOR_QUEUE
                );
                self.fifo_warned = true;
            }
            return Err(DmError::FifoNotEmpty(ACTUATOR_QUEUE));
        }
        self.fifo_warned = false;

        board
            .dma_write(ACTUATOR_QUEUE, &self.buffer, 1)
            .and_then(|_| board.enable_dma(ACTUATOR_QUEUE, ENABLE_ALL))
            .inspect_err(|e| tracing::error!("Failed to start actuator DMA: {}", e))?;
        tracing::trace!("Actuator block of {} frames sent", self.dithers);
        Ok(())
    }

    /// Tears down the queue and releases the buffer of this channel.
    pub(crate) fn cleanup<B: Board>(self, board: &mut B) -> Result<(), DmError> {
        Self::release(board, Some(self.buffer))
    }

    pub(crate) fn release<B: Board>(
        board: &mut B,
        buffer: Option<DmaBuffer>,
    ) -> Result<(), DmError> {
        teardown(board, ACTUATOR_QUEUE, buffer, true)
    }
}
