#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Actuator frame encoding and telemetry buffer bookkeeping.
//!
//! Nothing in this crate talks to hardware. [`actuator`] turns command vectors into device
//! frames, [`telemetry`] moves payload words into a DMA buffer that contains a reserved region,
//! and [`error`] defines the error type shared with the channel layer.

/// Command conditioning and device frame encoding.
pub mod actuator;
/// Error types.
pub mod error;
/// Telemetry buffer layout and fill cursor.
pub mod telemetry;

pub use dmstream_core as core;
