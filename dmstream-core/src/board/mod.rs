mod buffer;
mod error;
mod queue;

pub use buffer::DmaBuffer;
pub use error::BoardError;
pub use queue::{ClockMode, FifoDirection, FifoStatus, Queue, TriggerSource};

/// Enable mask that turns every bit of a FIFO or DMA engine on.
pub const ENABLE_ALL: u8 = 0xFF;
/// Enable mask that turns every bit of a FIFO or DMA engine off.
pub const DISABLE_ALL: u8 = 0x00;

/// A trait that provides the interface with the DMA/FIFO board.
///
/// Configuration primitives are idempotent and report success or failure.
/// [`Board::dma_write`] only hands a buffer to the engine; completion is
/// observed through [`Board::check_dma_complete`] and [`Board::fifo_status`].
pub trait Board: Send {
    /// Resets the board to its power-on state.
    fn reset(&mut self) -> Result<(), BoardError>;

    /// Closes the board.
    fn close(&mut self) -> Result<(), BoardError>;

    /// Checks if the board is open.
    #[must_use]
    fn is_open(&self) -> bool;

    /// Programs the clock that paces `queue` with the given rate divisor.
    fn configure_clock(&mut self, queue: Queue, divisor: u32) -> Result<(), BoardError>;

    /// Starts or stops the clock that paces `queue`.
    fn set_clock_mode(&mut self, queue: Queue, mode: ClockMode) -> Result<(), BoardError>;

    /// Sets the data direction and output trigger of a FIFO.
    fn configure_fifo(
        &mut self,
        queue: Queue,
        direction: FifoDirection,
        trigger: TriggerSource,
    ) -> Result<(), BoardError>;

    /// Enables (or disables with [`DISABLE_ALL`]) a FIFO.
    fn enable_fifo(&mut self, queue: Queue, mask: u8) -> Result<(), BoardError>;

    /// Initializes the DMA engine of `queue` for buffers of `bytes` bytes.
    fn configure_dma(&mut self, queue: Queue, bytes: usize) -> Result<(), BoardError>;

    /// Enables (or disables with [`DISABLE_ALL`]) the DMA engine of `queue`.
    fn enable_dma(&mut self, queue: Queue, mask: u8) -> Result<(), BoardError>;

    /// Allocates a hardware-visible buffer of `bytes` bytes.
    fn allocate_dma_buffer(&mut self, bytes: usize) -> Result<DmaBuffer, BoardError>;

    /// Releases a buffer obtained from [`Board::allocate_dma_buffer`].
    fn free_dma_buffer(&mut self, buffer: DmaBuffer) -> Result<(), BoardError>;

    /// Hands `blocks` copies of `buffer` to the DMA engine of `queue`.
    fn dma_write(&mut self, queue: Queue, buffer: &DmaBuffer, blocks: u32)
        -> Result<(), BoardError>;

    /// Returns `true` if the last DMA transfer on `queue` has completed.
    #[must_use]
    fn check_dma_complete(&mut self, queue: Queue) -> bool;

    /// Reads a FIFO status flag.
    fn fifo_status(&mut self, queue: Queue, status: FifoStatus) -> Result<bool, BoardError>;
}

impl Board for Box<dyn Board> {
    fn reset(&mut self) -> Result<(), BoardError> {
        self.as_mut().reset()
    }

    fn close(&mut self) -> Result<(), BoardError> {
        self.as_mut().close()
    }

    fn is_open(&self) -> bool {
        self.as_ref().is_open()
    }

    fn configure_clock(&mut self, queue: Queue, divisor: u32) -> Result<(), BoardError> {
        self.as_mut().configure_clock(queue, divisor)
    }

    fn set_clock_mode(&mut self, queue: Queue, mode: ClockMode) -> Result<(), BoardError> {
        self.as_mut().set_clock_mode(queue, mode)
    }

    fn configure_fifo(
        &mut self,
        queue: Queue,
        direction: FifoDirection,
        trigger: TriggerSource,
    ) -> Result<(), BoardError> {
        self.as_mut().configure_fifo(queue, direction, trigger)
    }

    fn enable_fifo(&mut self, queue: Queue, mask: u8) -> Result<(), BoardError> {
        self.as_mut().enable_fifo(queue, mask)
    }

    fn configure_dma(&mut self, queue: Queue, bytes: usize) -> Result<(), BoardError> {
        self.as_mut().configure_dma(queue, bytes)
    }

    fn enable_dma(&mut self, queue: Queue, mask: u8) -> Result<(), BoardError> {
        self.as_mut().enable_dma(queue, mask)
    }

    fn allocate_dma_buffer(&mut self, bytes: usize) -> Result<DmaBuffer, BoardError> {
        self.as_mut().allocate_dma_buffer(bytes)
    }

    fn free_dma_buffer(&mut self, buffer: DmaBuffer) -> Result<(), BoardError> {
        self.as_mut().free_dma_buffer(buffer)
    }

    fn dma_write(
        &mut self,
        queue: Queue,
        buffer: &DmaBuffer,
        blocks: u32,
    ) -> Result<(), BoardError> {
        self.as_mut().dma_write(queue, buffer, blocks)
    }

    fn check_dma_complete(&mut self, queue: Queue) -> bool {
        self.as_mut().check_dma_complete(queue)
    }

    fn fifo_status(&mut self, queue: Queue, status: FifoStatus) -> Result<bool, BoardError> {
        self.as_mut().fifo_status(queue, status)
    }
}
