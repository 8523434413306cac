mod actuator;

use anyhow::Result;
use dmstream::prelude::*;
use dmstream_emulator::BoardEmulator;

pub fn run(mut dm: Controller<BoardEmulator>) -> Result<()> {
    dm.init_actuator_channel(4)?;
    dm.init_telemetry_channel(2048)?;

    actuator::sweep(&mut dm)?;
    telemetry::stream(&mut dm)?;
    telemetry::pattern(&mut dm)?;

    dm.close()?;
    Ok(())
}
