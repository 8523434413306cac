use derive_more::Display;

/// A FIFO queue of the board together with its DMA engine.
#[repr(u8)]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Queue {
    /// FIFO 0, clocked out by the programmable clock.
    #[display("FIFO0")]
    Q0 = 0,
    /// FIFO 1, clocked out by an external strobe.
    #[display("FIFO1")]
    Q1 = 1,
}

impl Queue {
    /// All queues of the board.
    pub const ALL: [Queue; 2] = [Queue::Q0, Queue::Q1];

    #[doc(hidden)]
    #[must_use]
    pub const fn idx(self) -> usize {
        self as usize
    }
}

/// State of a programmable clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockMode {
    /// The clock is stopped.
    #[default]
    Disabled,
    /// The clock runs continuously.
    Continuous,
}

/// Direction of the data that flows through a FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FifoDirection {
    /// Data is written by the host over PCI and read out by a port.
    PciToBoard,
    /// Data is written by a port and read by the host over PCI.
    BoardToPci,
}

/// The signal that clocks words out of a FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    /// The programmable clock of the queue.
    ProgrammableClock,
    /// An external read strobe.
    Strobe,
}

/// A FIFO status flag.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum FifoStatus {
    /// Set while the FIFO holds no data.
    Empty,
    /// Set while the FIFO is too full to accept another DMA burst.
    ReadRequest,
}
