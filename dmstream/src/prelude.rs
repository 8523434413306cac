pub use crate::{
    channel::{ActuatorChannel, TelemetryChannel},
    controller::{
        ActuatorOption, ActuatorSender, Controller, ControllerOption, TelemetryOption,
        TelemetrySender,
    },
};

pub use dmstream_core::{
    board::{Board, BoardError, DmaBuffer, Queue},
    sleep::{Sleep, SpinSleeper, StdSleeper},
    wait::PollOption,
};
pub use dmstream_driver::{
    actuator::{ActuatorMap, CommandLimits, DitherMode, FrameProtocol},
    error::{DmError, ErrorCategory},
    telemetry::{FlushMode, TelemetryLayout},
};
