#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Streams deformable-mirror commands and telemetry through a DMA/FIFO board.
//!
//! [`Controller`] owns a [`Board`](dmstream_core::board::Board) and two output channels:
//! the actuator channel turns command vectors into dithered device frames, the telemetry channel
//! packs an arbitrary byte stream into fixed-size DMA buffers.

/// Actuator and telemetry channels.
pub mod channel;
/// [`Controller`] and its options.
pub mod controller;
/// Commonly used items.
pub mod prelude;

pub use dmstream_core as core;
pub use dmstream_driver as driver;

pub use controller::Controller;
