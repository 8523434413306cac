use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dmstream_core::board::{
    Board, BoardError, ClockMode, DmaBuffer, FifoDirection, FifoStatus, Queue, TriggerSource,
};

use crate::BoardEmulator;

/// A cloneable handle to a [`BoardEmulator`].
///
/// One clone can be given to a controller while another inspects the board, even after the
/// controller has been dropped.
#[derive(Debug, Clone, Default)]
pub struct SharedBoard {
    inner: Arc<Mutex<BoardEmulator>>,
}

impl SharedBoard {
    /// Wraps `board`.
    #[must_use]
    pub fn new(board: BoardEmulator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(board)),
        }
    }

    /// Locks the board.
    pub fn lock(&self) -> MutexGuard<'_, BoardEmulator> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Board for SharedBoard {
    fn reset(&mut self) -> Result<(), BoardError> {
        self.lock().reset()
    }

    fn close(&mut self) -> Result<(), BoardError> {
        self.lock().close()
    }

    fn is_open(&self) -> bool {
        self.lock().is_open()
    }

    fn configure_clock(&mut self, queue: Queue, divisor: u32) -> Result<(), BoardError> {
        self.lock().configure_clock(queue, divisor)
    }

    fn set_clock_mode(&mut self, queue: Queue, mode: ClockMode) -> Result<(), BoardError> {
        self.lock().set_clock_mode(queue, mode)
    }

    fn configure_fifo(
        &mut self,
        queue: Queue,
        direction: FifoDirection,
        trigger: TriggerSource,
    ) -> Result<(), BoardError> {
        self.lock().configure_fifo(queue, direction, trigger)
    }

    fn enable_fifo(&mut self, queue: Queue, mask: u8) -> Result<(), BoardError> {
        self.lock().enable_fifo(queue, mask)
    }

    fn configure_dma(&mut self, queue: Queue, bytes: usize) -> Result<(), BoardError> {
        self.lock().configure_dma(queue, bytes)
    }

    fn enable_dma(&mut self, queue: Queue, mask: u8) -> Result<(), BoardError> {
        self.lock().enable_dma(queue, mask)
    }

    fn allocate_dma_buffer(&mut self, bytes: usize) -> Result<DmaBuffer, BoardError> {
        self.lock().allocate_dma_buffer(bytes)
    }

    fn free_dma_buffer(&mut self, buffer: DmaBuffer) -> Result<(), BoardError> {
        self.lock().free_dma_buffer(buffer)
    }

    fn dma_write(
        &mut self,
        queue: Queue,
        buffer: &DmaBuffer,
        blocks: u32,
    ) -> Result<(), BoardError> {
        self.lock().dma_write(queue, buffer, blocks)
    }

    fn check_dma_complete(&mut self, queue: Queue) -> bool {
        self.lock().check_dma_complete(queue)
    }

    fn fifo_status(&mut self, queue: Queue, status: FifoStatus) -> Result<bool, BoardError> {
        self.lock().fifo_status(queue, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_state() -> anyhow::Result<()> {
        let handle = SharedBoard::default();
        let mut board = handle.clone();
        board.configure_clock(Queue::Q0, 10)?;
        board.close()?;
        assert_eq!(Some(10), handle.lock().queue(Queue::Q0).clock_divisor());
        assert!(!handle.is_open());
        Ok(())
    }
}
