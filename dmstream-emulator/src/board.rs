use std::collections::HashSet;

use dmstream_core::board::{
    Board, BoardError, ClockMode, DmaBuffer, FifoDirection, FifoStatus, Queue, TriggerSource,
    DISABLE_ALL,
};

use crate::queue::QueueEmulator;

/// Fallible operations of [`Board`], used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardOp {
    Reset,
    Close,
    ConfigureClock,
    SetClockMode,
    ConfigureFifo,
    EnableFifo,
    ConfigureDma,
    EnableDma,
    AllocateDmaBuffer,
    FreeDmaBuffer,
    DmaWrite,
    FifoStatus,
}

/// A [`Board`] that keeps its registers and transfers in memory.
#[derive(Debug)]
pub struct BoardEmulator {
    is_open: bool,
    queues: [QueueEmulator; 2],
    live_buffers: usize,
    allocated_bytes: Vec<usize>,
    failures: HashSet<BoardOp>,
    log: Vec<(BoardOp, Option<Queue>)>,
}

impl BoardEmulator {
    /// Creates an open board with both queues idle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            is_open: true,
            queues: Default::default(),
            live_buffers: 0,
            allocated_bytes: Vec::new(),
            failures: HashSet::new(),
            log: Vec::new(),
        }
    }

    /// State of `queue`.
    #[must_use]
    pub fn queue(&self, queue: Queue) -> &QueueEmulator {
        &self.queues[queue.idx()]
    }

    /// Number of DMA buffers allocated and not yet freed.
    #[must_use]
    pub const fn live_buffers(&self) -> usize {
        self.live_buffers
    }

    /// Sizes of every allocation, oldest first.
    #[must_use]
    pub fn allocated_bytes(&self) -> &[usize] {
        &self.allocated_bytes
    }

    /// Every fallible operation called so far with its queue, oldest first.
    #[must_use]
    pub fn log(&self) -> &[(BoardOp, Option<Queue>)] {
        &self.log
    }

    /// Forgets the operation log.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Makes every later call of `op` fail.
    pub fn fail_on(&mut self, op: BoardOp) {
        self.failures.insert(op);
    }

    /// Undoes [`BoardEmulator::fail_on`] for every operation.
    pub fn repair(&mut self) {
        self.failures.clear();
    }

    /// Keeps the DMA of `queue` busy for `polls` completion checks after each write.
    pub fn set_dma_latency(&mut self, queue: Queue, polls: u32) {
        self.queues[queue.idx()].dma_latency = polls;
    }

    /// Makes the DMA of `queue` never (or again) complete.
    pub fn set_dma_stuck(&mut self, queue: Queue, stuck: bool) {
        self.queues[queue.idx()].dma_stuck = stuck;
    }

    /// Makes the FIFO of `queue` report that it still holds data.
    pub fn set_fifo_backlog(&mut self, queue: Queue, backlog: bool) {
        self.queues[queue.idx()].fifo_backlog = backlog;
    }

    /// Keeps the read request of `queue` raised for `polls` checks after each write.
    pub fn set_read_request_latency(&mut self, queue: Queue, polls: u32) {
        self.queues[queue.idx()].read_request_latency = polls;
    }

    /// Makes the read request of `queue` never (or again) clear.
    pub fn set_read_request_stuck(&mut self, queue: Queue, stuck: bool) {
        self.queues[queue.idx()].read_request_stuck = stuck;
    }

    fn call(&mut self, op: BoardOp, queue: Option<Queue>) -> Result<(), BoardError> {
        self.log.push((op, queue));
        if !self.is_open && op != BoardOp::Close {
            return Err(BoardError::new("board is closed".to_string()));
        }
        if self.failures.contains(&op) {
            tracing::trace!("Injected failure of {:?}", op);
            return Err(BoardError::new(format!("{:?} failed", op)));
        }
        Ok(())
    }

    fn queue_mut(&mut self, queue: Queue) -> &mut QueueEmulator {
        &mut self.queues[queue.idx()]
    }
}

impl Default for BoardEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Board for BoardEmulator {
    fn reset(&mut self) -> Result<(), BoardError> {
        self.call(BoardOp::Reset, None)?;
        self.queues.iter_mut().for_each(QueueEmulator::reset);
        Ok(())
    }

    fn close(&mut self) -> Result<(), BoardError> {
        self.call(BoardOp::Close, None)?;
        self.is_open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.is_open
    }

    fn configure_clock(&mut self, queue: Queue, divisor: u32) -> Result<(), BoardError> {
        self.call(BoardOp::ConfigureClock, Some(queue))?;
        self.queue_mut(queue).clock_divisor = Some(divisor);
        Ok(())
    }

    fn set_clock_mode(&mut self, queue: Queue, mode: ClockMode) -> Result<(), BoardError> {
        self.call(BoardOp::SetClockMode, Some(queue))?;
        self.queue_mut(queue).clock_mode = mode;
        Ok(())
    }

    fn configure_fifo(
        &mut self,
        queue: Queue,
        direction: FifoDirection,
        trigger: TriggerSource,
    ) -> Result<(), BoardError> {
        self.call(BoardOp::ConfigureFifo, Some(queue))?;
        self.queue_mut(queue).fifo_config = Some((direction, trigger));
        Ok(())
    }

    fn enable_fifo(&mut self, queue: Queue, mask: u8) -> Result<(), BoardError> {
        self.call(BoardOp::EnableFifo, Some(queue))?;
        self.queue_mut(queue).fifo_mask = mask;
        Ok(())
    }

    fn configure_dma(&mut self, queue: Queue, bytes: usize) -> Result<(), BoardError> {
        self.call(BoardOp::ConfigureDma, Some(queue))?;
        self.queue_mut(queue).dma_bytes = Some(bytes);
        Ok(())
    }

    fn enable_dma(&mut self, queue: Queue, mask: u8) -> Result<(), BoardError> {
        self.call(BoardOp::EnableDma, Some(queue))?;
        let q = self.queue_mut(queue);
        q.dma_mask = mask;
        if mask != DISABLE_ALL {
            q.dma_enable_count += 1;
        }
        Ok(())
    }

    fn allocate_dma_buffer(&mut self, bytes: usize) -> Result<DmaBuffer, BoardError> {
        self.call(BoardOp::AllocateDmaBuffer, None)?;
        self.live_buffers += 1;
        self.allocated_bytes.push(bytes);
        Ok(DmaBuffer::new_zeroed(bytes))
    }

    fn free_dma_buffer(&mut self, _buffer: DmaBuffer) -> Result<(), BoardError> {
        self.call(BoardOp::FreeDmaBuffer, None)?;
        if self.live_buffers == 0 {
            return Err(BoardError::new("no DMA buffer is allocated".to_string()));
        }
        self.live_buffers -= 1;
        Ok(())
    }

    fn dma_write(
        &mut self,
        queue: Queue,
        buffer: &DmaBuffer,
        blocks: u32,
    ) -> Result<(), BoardError> {
        self.call(BoardOp::DmaWrite, Some(queue))?;
        self.queue_mut(queue).write(buffer, blocks);
        Ok(())
    }

    fn check_dma_complete(&mut self, queue: Queue) -> bool {
        self.queue_mut(queue).check_dma_complete()
    }

    fn fifo_status(&mut self, queue: Queue, status: FifoStatus) -> Result<bool, BoardError> {
        self.call(BoardOp::FifoStatus, Some(queue))?;
        let q = self.queue_mut(queue);
        Ok(match status {
            FifoStatus::Empty => !q.fifo_backlog,
            FifoStatus::ReadRequest => q.read_request(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_close() -> anyhow::Result<()> {
        let mut board = BoardEmulator::new();
        assert!(board.is_open());
        board.close()?;
        assert!(!board.is_open());
        assert_eq!(
            Err(BoardError::new("board is closed".to_string())),
            board.reset()
        );
        Ok(())
    }

    #[test]
    fn buffers() -> anyhow::Result<()> {
        let mut board = BoardEmulator::new();
        let a = board.allocate_dma_buffer(0x400)?;
        let b = board.allocate_dma_buffer(0x800)?;
        assert_eq!(2, board.live_buffers());
        assert_eq!(0x200, a.len());
        board.free_dma_buffer(a)?;
        board.free_dma_buffer(b)?;
        assert_eq!(0, board.live_buffers());
        assert!(board.free_dma_buffer(DmaBuffer::new_zeroed(2)).is_err());
        assert_eq!([0x400, 0x800], board.allocated_bytes());
        Ok(())
    }

    #[rstest::rstest]
    #[test]
    #[case(BoardOp::ConfigureClock)]
    #[case(BoardOp::EnableFifo)]
    #[case(BoardOp::DmaWrite)]
    fn fail_on(#[case] op: BoardOp) -> anyhow::Result<()> {
        let mut board = BoardEmulator::new();
        board.fail_on(op);
        let buffer = DmaBuffer::new_zeroed(4);
        let res = match op {
            BoardOp::ConfigureClock => board.configure_clock(Queue::Q0, 1),
            BoardOp::EnableFifo => board.enable_fifo(Queue::Q0, 0xFF),
            _ => board.dma_write(Queue::Q0, &buffer, 1),
        };
        assert_eq!(Err(BoardError::new(format!("{:?} failed", op))), res);

        board.repair();
        board.configure_clock(Queue::Q0, 1)?;
        board.enable_fifo(Queue::Q0, 0xFF)?;
        board.dma_write(Queue::Q0, &buffer, 1)?;
        Ok(())
    }

    #[test]
    fn registers() -> anyhow::Result<()> {
        let mut board = BoardEmulator::new();
        board.configure_clock(Queue::Q0, 40)?;
        board.set_clock_mode(Queue::Q0, ClockMode::Continuous)?;
        board.configure_fifo(Queue::Q1, FifoDirection::PciToBoard, TriggerSource::Strobe)?;
        board.enable_dma(Queue::Q1, 0xFF)?;

        assert_eq!(Some(40), board.queue(Queue::Q0).clock_divisor());
        assert_eq!(ClockMode::Continuous, board.queue(Queue::Q0).clock_mode());
        assert_eq!(
            Some((FifoDirection::PciToBoard, TriggerSource::Strobe)),
            board.queue(Queue::Q1).fifo_config()
        );
        assert_eq!(1, board.queue(Queue::Q1).dma_enable_count());

        board.reset()?;
        assert_eq!(None, board.queue(Queue::Q0).clock_divisor());
        assert_eq!(ClockMode::Disabled, board.queue(Queue::Q0).clock_mode());
        assert_eq!(DISABLE_ALL, board.queue(Queue::Q1).dma_mask());
        Ok(())
    }

    #[test]
    fn fifo_status() -> anyhow::Result<()> {
        let mut board = BoardEmulator::new();
        assert!(board.fifo_status(Queue::Q0, FifoStatus::Empty)?);
        board.set_fifo_backlog(Queue::Q0, true);
        assert!(!board.fifo_status(Queue::Q0, FifoStatus::Empty)?);
        assert!(board.fifo_status(Queue::Q1, FifoStatus::Empty)?);

        board.set_read_request_stuck(Queue::Q1, true);
        assert!(board.fifo_status(Queue::Q1, FifoStatus::ReadRequest)?);
        board.set_read_request_stuck(Queue::Q1, false);
        assert!(!board.fifo_status(Queue::Q1, FifoStatus::ReadRequest)?);
        Ok(())
    }

    #[test]
    fn log() -> anyhow::Result<()> {
        let mut board = BoardEmulator::new();
        board.reset()?;
        board.enable_fifo(Queue::Q1, DISABLE_ALL)?;
        assert_eq!(
            [(BoardOp::Reset, None), (BoardOp::EnableFifo, Some(Queue::Q1))],
            board.log()
        );
        board.clear_log();
        assert!(board.log().is_empty());
        Ok(())
    }
}
