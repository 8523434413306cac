use std::time::Duration;

use derive_more::Display;
use dmstream_core::board::{BoardError, Queue};
use itertools::Itertools;
use thiserror::Error;

/// The hardware condition a blocking handshake waits for.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum WaitTarget {
    /// Completion of the previous DMA transfer.
    #[display("DMA completion")]
    DmaComplete,
    /// The FIFO read-request flag clearing.
    #[display("FIFO read request to clear")]
    FifoReady,
}

/// One of the two streaming channels.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Deformable-mirror command output.
    Actuator,
    /// Telemetry stream output.
    Telemetry,
}

/// Coarse classification of [`DmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The hardware is still busy; retrying later is expected to succeed.
    HardwareNotReady,
    /// A blocking handshake exceeded its time budget.
    Timeout,
    /// The caller passed an argument that can never succeed.
    MalformedInput,
    /// A driver call failed during setup, teardown or a transfer.
    Resource,
}

/// A interface for error handling in dmstream.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum DmError {
    /// The previous DMA transfer has not completed.
    #[error("DMA transfer on {0} is not done")]
    DmaNotDone(Queue),
    /// The output FIFO still holds data.
    #[error("{0} is not empty")]
    FifoNotEmpty(Queue),
    /// A hardware handshake timed out.
    #[error("Timed out waiting for {0} ({1:?})")]
    Timeout(WaitTarget, Duration),

    /// Telemetry payloads must consist of whole 16-bit words.
    #[error("Telemetry payload size ({0} bytes) is not a multiple of 2")]
    OddPayloadLength(usize),
    /// The command vector does not match the actuator map.
    #[error("Command vector length ({0}) does not match the number of actuators ({1})")]
    CommandLength(usize, usize),
    /// Dithers per frame must be positive.
    #[error("Dithers per frame ({0}) must be at least 1")]
    InvalidDithers(usize),
    /// The telemetry buffer cannot hold the reserved region and a data segment.
    #[error("Telemetry buffer size ({0} bytes) is invalid: {1}")]
    InvalidTelemetryBufferSize(u32, String),
    /// The actuator map is inconsistent with the frame protocol.
    #[error("Invalid actuator map: {0}")]
    InvalidActuatorMap(String),
    /// The frame protocol is self-contradictory.
    #[error("Invalid frame protocol: {0}")]
    InvalidFrameProtocol(String),
    /// The DMA buffer is too small for the dither block.
    #[error("DMA buffer ({1} words) is too small for {0} words")]
    BufferTooSmall(usize, usize),
    /// The channel has not been initialized.
    #[error("{0} channel is not initialized")]
    NotInitialized(ChannelKind),

    /// Error in the board driver.
    #[error("{0}")]
    Board(#[from] BoardError),
    /// One or more teardown steps failed.
    #[error("Cleanup failed: {}", .0.iter().join(", "))]
    Cleanup(Vec<BoardError>),
}

impl DmError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            DmError::DmaNotDone(_) | DmError::FifoNotEmpty(_) => ErrorCategory::HardwareNotReady,
            DmError::Timeout(..) => ErrorCategory::Timeout,
            DmError::OddPayloadLength(_)
            | DmError::CommandLength(..)
            | DmError::InvalidDithers(_)
            | DmError::InvalidTelemetryBufferSize(..)
            | DmError::InvalidActuatorMap(_)
            | DmError::InvalidFrameProtocol(_)
            | DmError::BufferTooSmall(..)
            | DmError::NotInitialized(_) => ErrorCategory::MalformedInput,
            DmError::Board(_) | DmError::Cleanup(_) => ErrorCategory::Resource,
        }
    }

    /// Returns `true` if sending the same data again later may succeed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self.category(), ErrorCategory::HardwareNotReady)
    }
}
