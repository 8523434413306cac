mod tests;

use anyhow::Result;

use dmstream::prelude::*;
use dmstream_emulator::BoardEmulator;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut board = BoardEmulator::new();
    board.set_dma_latency(Queue::Q0, 1);
    board.set_read_request_latency(Queue::Q1, 3);

    let dm = Controller::open(board)?;

    tests::run(dm)
}
