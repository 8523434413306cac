mod actuator;
mod telemetry;

pub use actuator::{ActuatorChannel, ACTUATOR_QUEUE};
pub use telemetry::{TelemetryChannel, TELEMETRY_QUEUE};

use dmstream_core::board::{Board, BoardError, ClockMode, DmaBuffer, Queue, DISABLE_ALL};
use dmstream_driver::error::DmError;
use itertools::Itertools;

/// Runs `setup` on a freshly allocated buffer. On failure the buffer is released and the
/// setup error is returned.
pub(crate) fn setup_buffer<B: Board>(
    board: &mut B,
    mut buffer: DmaBuffer,
    setup: impl FnOnce(&mut B, &mut DmaBuffer) -> Result<(), BoardError>,
) -> Result<DmaBuffer, DmError> {
    match setup(board, &mut buffer) {
        Ok(()) => Ok(buffer),
        Err(e) => {
            tracing::error!("Channel setup failed: {}", e);
            if let Err(free) = board.free_dma_buffer(buffer) {
                tracing::error!("Failed to release DMA buffer: {}", free);
            }
            Err(e.into())
        }
    }
}

/// Disables the DMA engine, frees `buffer`, stops the clock if `stop_clock` and disables the
/// FIFO of `queue`. Every step runs even if an earlier one fails.
pub(crate) fn teardown<B: Board>(
    board: &mut B,
    queue: Queue,
    buffer: Option<DmaBuffer>,
    stop_clock: bool,
) -> Result<(), DmError> {
    let mut errors = Vec::new();
    errors.extend(board.enable_dma(queue, DISABLE_ALL).err());
    if let Some(buffer) = buffer {
        errors.extend(board.free_dma_buffer(buffer).err());
    }
    if stop_clock {
        errors.extend(board.set_clock_mode(queue, ClockMode::Disabled).err());
    }
    errors.extend(board.enable_fifo(queue, DISABLE_ALL).err());

    if errors.is_empty() {
        tracing::debug!("{} released", queue);
        return Ok(());
    }
    tracing::error!("Failed to release {}: {}", queue, errors.iter().join(", "));
    Err(DmError::Cleanup(errors))
}
