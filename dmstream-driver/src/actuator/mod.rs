mod condition;
mod dither;
mod frame;
mod map;
mod protocol;

pub use condition::CommandLimits;
pub use dither::{dither_bit, DitherMode};
pub use frame::{checksum, verify_frame, FrameEncoder};
pub use map::{ActuatorMap, HiddenActuator};
pub use protocol::{FrameProtocol, MIN_BUFFER_WORDS};
