use dmstream_core::board::{ClockMode, FifoDirection, TriggerSource, DISABLE_ALL};
use dmstream_driver::{actuator::FrameProtocol, telemetry::TelemetryLayout};

/// Copy of a buffer handed to [`Board::dma_write`](dmstream_core::board::Board::dma_write).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Words of the buffer at the time of the write.
    pub words: Vec<u16>,
    /// Number of blocks requested.
    pub blocks: u32,
}

impl Transfer {
    /// Splits the leading `dithers` device frames out of an actuator transfer.
    pub fn frames<'a>(
        &'a self,
        protocol: &FrameProtocol,
        dithers: usize,
    ) -> impl Iterator<Item = &'a [u16]> + 'a {
        self.words
            .chunks_exact(protocol.data_length())
            .take(dithers)
    }

    /// Data words of a telemetry transfer: every slot outside the reserved region except the
    /// sealing slot.
    pub fn telemetry_data(&self, layout: &TelemetryLayout) -> Vec<u16> {
        let last = self.words.len().saturating_sub(1);
        self.words[..last]
            .iter()
            .enumerate()
            .filter(|(i, _)| !layout.is_reserved(*i))
            .map(|(_, &w)| w)
            .collect()
    }
}

/// State of one FIFO/DMA queue of the emulated board.
#[derive(Debug, Clone, Default)]
pub struct QueueEmulator {
    pub(crate) clock_divisor: Option<u32>,
    pub(crate) clock_mode: ClockMode,
    pub(crate) fifo_config: Option<(FifoDirection, TriggerSource)>,
    pub(crate) fifo_mask: u8,
    pub(crate) dma_bytes: Option<usize>,
    pub(crate) dma_mask: u8,
    pub(crate) dma_enable_count: usize,
    pub(crate) transfers: Vec<Transfer>,
    pub(crate) dma_latency: u32,
    pub(crate) dma_busy: u32,
    pub(crate) dma_stuck: bool,
    pub(crate) fifo_backlog: bool,
    pub(crate) read_request_latency: u32,
    pub(crate) read_request: u32,
    pub(crate) read_request_stuck: bool,
}

impl QueueEmulator {
    /// Divisor passed to the last clock configuration.
    #[must_use]
    pub const fn clock_divisor(&self) -> Option<u32> {
        self.clock_divisor
    }

    /// Current clock mode.
    #[must_use]
    pub const fn clock_mode(&self) -> ClockMode {
        self.clock_mode
    }

    /// Direction and trigger of the last FIFO configuration.
    #[must_use]
    pub const fn fifo_config(&self) -> Option<(FifoDirection, TriggerSource)> {
        self.fifo_config
    }

    /// Current FIFO enable mask.
    #[must_use]
    pub const fn fifo_mask(&self) -> u8 {
        self.fifo_mask
    }

    /// Buffer size passed to the last DMA configuration.
    #[must_use]
    pub const fn dma_bytes(&self) -> Option<usize> {
        self.dma_bytes
    }

    /// Current DMA enable mask.
    #[must_use]
    pub const fn dma_mask(&self) -> u8 {
        self.dma_mask
    }

    /// Number of times the DMA engine was enabled with a non-zero mask.
    #[must_use]
    pub const fn dma_enable_count(&self) -> usize {
        self.dma_enable_count
    }

    /// Every transfer written to this queue, oldest first.
    #[must_use]
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    /// The most recent transfer.
    #[must_use]
    pub fn last_transfer(&self) -> Option<&Transfer> {
        self.transfers.last()
    }

    pub(crate) fn reset(&mut self) {
        self.clock_divisor = None;
        self.clock_mode = ClockMode::Disabled;
        self.fifo_config = None;
        self.fifo_mask = DISABLE_ALL;
        self.dma_bytes = None;
        self.dma_mask = DISABLE_ALL;
        self.dma_busy = 0;
        self.read_request = 0;
    }

    pub(crate) fn write(&mut self, words: &[u16], blocks: u32) {
        self.transfers.push(Transfer {
            words: words.to_vec(),
            blocks,
        });
        self.dma_busy = self.dma_latency;
        self.read_request = self.read_request_latency;
    }

    pub(crate) fn check_dma_complete(&mut self) -> bool {
        if self.dma_stuck {
            return false;
        }
        if self.dma_busy > 0 {
            self.dma_busy -= 1;
            return false;
        }
        true
    }

    pub(crate) fn read_request(&mut self) -> bool {
        if self.read_request_stuck {
            return true;
        }
        if self.read_request > 0 {
            self.read_request -= 1;
            return true;
        }
        false
    }
}
