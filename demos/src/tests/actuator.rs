use anyhow::Result;
use dmstream::prelude::*;
use dmstream_emulator::BoardEmulator;

pub fn sweep(dm: &mut Controller<BoardEmulator>) -> Result<()> {
    let mut sent = 0;
    let mut busy = 0;
    for step in 0..100 {
        let phase = step as f64 * std::f64::consts::TAU / 100.0;
        let mut cmd = (0..97)
            .map(|i| 0.5 * (phase + i as f64 * 0.1).sin())
            .collect::<Vec<_>>();
        match dm.send_actuator_command(&mut cmd) {
            Ok(()) => sent += 1,
            Err(e) if e.is_retriable() => busy += 1,
            Err(e) => return Err(e.into()),
        }
    }
    tracing::info!("actuator sweep: {} blocks sent, {} skipped", sent, busy);
    Ok(())
}
