#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Core traits and types for dmstream.
//!
//! This crate defines the contract between the streaming core and the
//! board-level DMA/FIFO driver ([`board::Board`]) together with the timing
//! primitives used for hardware handshakes ([`sleep`] and [`wait`]).

/// The interface to the DMA/FIFO board.
pub mod board;
/// Sleep strategies.
pub mod sleep;
/// Bounded polling.
pub mod wait;

#[doc(hidden)]
pub use tracing;
