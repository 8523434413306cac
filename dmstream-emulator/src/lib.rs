//! A DMA/FIFO board that lives in memory.
//!
//! [`BoardEmulator`] implements [`Board`](dmstream_core::board::Board), records every transfer
//! and lets tests inject latency and failures. [`VirtualSleeper`] advances a counter instead of
//! sleeping so polling loops finish instantly.

mod board;
mod queue;
mod shared;
mod sleeper;

pub use board::{BoardEmulator, BoardOp};
pub use queue::{QueueEmulator, Transfer};
pub use shared::SharedBoard;
pub use sleeper::VirtualSleeper;
