mod cursor;
mod layout;

pub use cursor::FillCursor;
pub use layout::TelemetryLayout;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a telemetry send does with the buffer besides inserting the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FlushMode {
    /// Transfer only when the buffer is full.
    #[default]
    None,
    /// Pad the rest of the buffer with the empty code and transfer it.
    Pad,
    /// Discard the payload and transfer a counter pattern for hardware self-test.
    ForcePattern,
}
