use std::time::Duration;

use dmstream_core::{
    board::{
        Board, DmaBuffer, FifoDirection, FifoStatus, Queue, TriggerSource, DISABLE_ALL,
        ENABLE_ALL,
    },
    sleep::Sleep,
    wait::{poll_until, PollOption},
};
use dmstream_driver::{
    error::{DmError, WaitTarget},
    telemetry::{FillCursor, FlushMode, TelemetryLayout},
};
use getset::{CopyGetters, Getters};

use super::{setup_buffer, teardown};
use crate::controller::TelemetryOption;

/// Queue that carries telemetry.
pub const TELEMETRY_QUEUE: Queue = Queue::Q1;

/// Output channel for the telemetry stream.
///
/// Payloads are packed into the DMA buffer around its reserved region. A transfer happens each
/// time the buffer fills up, and blocks until the hardware has accepted it.
#[derive(Debug, Getters, CopyGetters)]
pub struct TelemetryChannel {
    /// Reserved region and sentinel codes.
    #[getset(get = "pub")]
    layout: TelemetryLayout,
    /// The DMA buffer being filled.
    #[getset(get = "pub")]
    buffer: DmaBuffer,
    /// Position of the next payload word.
    #[getset(get_copy = "pub")]
    cursor: FillCursor,
    /// Polling policy of the transfer handshake.
    #[getset(get_copy = "pub")]
    poll: PollOption,
    /// Time slept between DMA completion and the next write.
    #[getset(get_copy = "pub")]
    settle: Duration,
    /// Number of completed transfers.
    #[getset(get_copy = "pub")]
    transfers: usize,
}

impl TelemetryChannel {
    /// Checks that a buffer of `bytes` bytes is usable with `layout`.
    pub fn check_size(layout: &TelemetryLayout, bytes: u32) -> Result<(), DmError> {
        if bytes % 2 != 0 {
            return Err(DmError::InvalidTelemetryBufferSize(
                bytes,
                "size must be a multiple of 2".to_string(),
            ));
        }
        layout
            .validate(bytes as usize / size_of::<u16>())
            .map_err(|reason| DmError::InvalidTelemetryBufferSize(bytes, reason))
    }

    /// Configures the FIFO and DMA of [`TELEMETRY_QUEUE`].
    ///
    /// The queue must already be torn down and `bytes` checked with
    /// [`TelemetryChannel::check_size`].
    pub(crate) fn init<B: Board>(
        board: &mut B,
        option: &TelemetryOption,
        bytes: u32,
    ) -> Result<Self, DmError> {
        tracing::debug!("Initialize telemetry channel: {} bytes", bytes);
        let bytes = bytes as usize;

        board.enable_fifo(TELEMETRY_QUEUE, DISABLE_ALL)?;
        board.configure_fifo(
            TELEMETRY_QUEUE,
            FifoDirection::PciToBoard,
            TriggerSource::Strobe,
        )?;
        let buffer = board.allocate_dma_buffer(bytes)?;
        let buffer = setup_buffer(board, buffer, |board, buffer| {
            board.configure_dma(TELEMETRY_QUEUE, bytes)?;
            buffer.clear();
            board.enable_fifo(TELEMETRY_QUEUE, ENABLE_ALL)
        })?;

        Ok(Self {
            layout: option.layout,
            buffer,
            cursor: FillCursor::new(),
            poll: option.poll,
            settle: option.settle,
            transfers: 0,
        })
    }

    /// Appends `payload` to the stream.
    ///
    /// Each time the buffer fills up it is sealed and transferred. With [`FlushMode::Pad`] the
    /// pending data is padded and transferred even if the buffer is not full. With
    /// [`FlushMode::ForcePattern`] the payload is ignored and a counter pattern is transferred.
    pub fn send<B: Board, S: Sleep + ?Sized>(
        &mut self,
        board: &mut B,
        sleeper: &S,
        payload: &[u8],
        flush: FlushMode,
    ) -> Result<(), DmError> {
        if payload.len() % 2 != 0 {
            return Err(DmError::OddPayloadLength(payload.len()));
        }

        self.layout.scrub(&mut self.buffer);

        if flush == FlushMode::ForcePattern {
            self.layout.fill_pattern(&mut self.buffer);
            self.cursor.reset();
            return self.transfer(board, sleeper);
        }

        let words = payload.len() / size_of::<u16>();
        let mut consumed = 0;
        loop {
            consumed += self.cursor.insert(
                &mut self.buffer,
                &self.layout,
                &payload[consumed * size_of::<u16>()..],
            );
            if flush == FlushMode::Pad && consumed == words && self.cursor.is_pending() {
                self.cursor.pad(&mut self.buffer, &self.layout);
            }
            if self.cursor.is_full(self.buffer.len()) {
                self.cursor.seal(&mut self.buffer, &self.layout);
                self.transfer(board, sleeper)?;
            }
            if consumed == words {
                return Ok(());
            }
        }
    }

    fn transfer<B: Board, S: Sleep + ?Sized>(
        &mut self,
        board: &mut B,
        sleeper: &S,
    ) -> Result<(), DmError> {
        if !poll_until(sleeper, &self.poll, || {
            Ok::<_, DmError>(board.check_dma_complete(TELEMETRY_QUEUE))
        })? {
            tracing::error!("Timed out waiting for telemetry DMA to complete");
            return Err(DmError::Timeout(WaitTarget::DmaComplete, self.poll.timeout));
        }

        sleeper.sleep(self.settle);

        board
            .dma_write(TELEMETRY_QUEUE, &self.buffer, 1)
            .inspect_err(|e| tracing::error!("Failed to write telemetry DMA: {}", e))?;

        if !poll_until(sleeper, &self.poll, || {
            board
                .fifo_status(TELEMETRY_QUEUE, FifoStatus::ReadRequest)
                .map(|requested| !requested)
        })? {
            tracing::error!("Timed out waiting for {} to drain", TELEMETRY_QUEUE);
            return Err(DmError::Timeout(WaitTarget::FifoReady, self.poll.timeout));
        }

        board
            .enable_dma(TELEMETRY_QUEUE, ENABLE_ALL)
            .inspect_err(|e| tracing::error!("Failed to enable telemetry DMA: {}", e))?;

        self.transfers += 1;
        tracing::trace!("Telemetry transfer #{} started", self.transfers);
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
        teardown(board, TELEMETRY_QUEUE, buffer, false)
    }
}
