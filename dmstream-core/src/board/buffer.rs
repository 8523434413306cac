use derive_more::{Deref, DerefMut};
use zerocopy::IntoBytes;

/// The host image of a hardware-visible DMA buffer.
///
/// The buffer is a sequence of 16-bit words. Its size never changes after
/// allocation, so writing into it never allocates.
#[derive(Clone, Debug, PartialEq, Eq, Deref, DerefMut)]
pub struct DmaBuffer {
    #[deref(forward)]
    #[deref_mut(forward)]
    words: Box<[u16]>,
}

impl DmaBuffer {
    /// Creates a zero-filled buffer of `bytes` bytes. An odd trailing byte is dropped.
    #[must_use]
    pub fn new_zeroed(bytes: usize) -> Self {
        Self {
            words: vec![0; bytes / size_of::<u16>()].into_boxed_slice(),
        }
    }

    /// Size of the buffer in bytes.
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.words.len() * size_of::<u16>()
    }

    /// Raw bytes of the buffer in native byte order.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.words.as_bytes()
    }

    /// Fills the whole buffer with zeros.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[test]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(2, 1)]
    #[case(0x400, 0x200)]
    fn new_zeroed(#[case] bytes: usize, #[case] expect_words: usize) {
        let buf = DmaBuffer::new_zeroed(bytes);
        assert_eq!(expect_words, buf.len());
        assert_eq!(expect_words * 2, buf.len_bytes());
        assert!(buf.iter().all(|&w| w == 0));
    }

    #[test]
    fn as_bytes() {
        let mut buf = DmaBuffer::new_zeroed(4);
        buf[0] = 0x1234;
        buf[1] = 0xABCD;
        assert_eq!(
            [0x1234u16.to_ne_bytes(), 0xABCDu16.to_ne_bytes()].concat(),
            buf.as_bytes()
        );
    }

    #[test]
    fn clear() {
        let mut buf = DmaBuffer::new_zeroed(8);
        buf.fill(0xFFFF);
        buf.clear();
        assert!(buf.iter().all(|&w| w == 0));
    }
}
