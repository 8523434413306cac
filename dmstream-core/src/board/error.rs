use derive_more::Display;
use derive_new::new;
use thiserror::Error;

#[derive(new, Error, Debug, Display, PartialEq, Eq, Clone)]
#[display("{}", msg)]
/// An error produced by the board driver.
pub struct BoardError {
    msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = BoardError::new("DM7820_FIFO_DMA_Write failed".to_string());
        assert_eq!("DM7820_FIFO_DMA_Write failed", format!("{}", err));
    }
}
