use super::TelemetryLayout;

/// Write position of the telemetry buffer that persists between sends.
///
/// The cursor never rests inside the reserved region: reaching its start moves the cursor past
/// its end. The last word of the buffer is kept for the sealing empty code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillCursor {
    position: usize,
}

impl FillCursor {
    /// Creates a cursor at the start of the buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { position: 0 }
    }

    /// Index of the next word to be written.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns `true` if data has been written since the last seal.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.position != 0
    }

    /// Returns `true` if only the sealing slot of a `buffer_length` words buffer is left.
    #[must_use]
    pub const fn is_full(&self, buffer_length: usize) -> bool {
        self.position + 1 >= buffer_length
    }

    /// Moves the cursor back to the start of the buffer.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    fn skip_reserved(&mut self, layout: &TelemetryLayout) {
        if self.position == layout.reserved_start {
            self.position = layout.reserved_end + 1;
        }
    }

    /// Copies native-endian words of `payload` into `buffer` until the payload is exhausted or
    /// the buffer is full, and returns the number of words consumed.
    ///
    /// Words equal to the empty code are written as the replace code.
    pub fn insert(&mut self, buffer: &mut [u16], layout: &TelemetryLayout, payload: &[u8]) -> usize {
        let last = buffer.len() - 1;
        let mut words = payload
            .chunks_exact(2)
            .map(|b| layout.substitute(u16::from_ne_bytes([b[0], b[1]])));
        let mut consumed = 0;
        loop {
            self.skip_reserved(layout);
            let end = if self.position < layout.reserved_start {
                layout.reserved_start
            } else {
                last
            };
            if self.position >= end {
                break;
            }
            let n = buffer[self.position..end]
                .iter_mut()
                .zip(words.by_ref())
                .map(|(dst, w)| *dst = w)
                .count();
            if n == 0 {
                break;
            }
            self.position += n;
            consumed += n;
        }
        self.skip_reserved(layout);
        tracing::trace!(
            "Inserted {} telemetry words, cursor at {}",
            consumed,
            self.position
        );
        consumed
    }

    /// Fills the rest of the buffer, up to the sealing slot, with the empty code.
    pub fn pad(&mut self, buffer: &mut [u16], layout: &TelemetryLayout) {
        let last = buffer.len() - 1;
        if self.position < last {
            buffer[self.position..last].fill(layout.empty_code);
            self.position = last;
        }
    }

    /// Writes the empty code into the last slot and moves the cursor back to the start.
    pub fn seal(&mut self, buffer: &mut [u16], layout: &TelemetryLayout) {
        if let Some(last) = buffer.last_mut() {
            *last = layout.empty_code;
        }
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(words: impl IntoIterator<Item = u16>) -> Vec<u8> {
        words.into_iter().flat_map(u16::to_ne_bytes).collect()
    }

    fn fresh(len: usize) -> (Vec<u16>, TelemetryLayout) {
        let layout = TelemetryLayout::DEFAULT;
        let mut buffer = vec![0u16; len];
        layout.scrub(&mut buffer);
        (buffer, layout)
    }

    #[test]
    fn skips_reserved_region() {
        let (mut buffer, layout) = fresh(1024);
        let mut cursor = FillCursor::new();

        let first = bytes(0..256);
        assert_eq!(256, cursor.insert(&mut buffer, &layout, &first));
        assert_eq!(263, cursor.position());
        assert!(!cursor.is_full(buffer.len()));

        let second = bytes(1000..1150);
        assert_eq!(150, cursor.insert(&mut buffer, &layout, &second));
        assert_eq!(413, cursor.position());
        assert!(!cursor.is_full(buffer.len()));

        (0..256).for_each(|i| assert_eq!(i as u16, buffer[i]));
        assert!(buffer[256..=262].iter().all(|&w| w == 0xFADE));
        (263..413).for_each(|i| assert_eq!((i - 263 + 1000) as u16, buffer[i]));
        assert!(buffer[413..].iter().all(|&w| w == 0));
    }

    #[test]
    fn substitutes_empty_code() {
        let (mut buffer, layout) = fresh(1024);
        let mut cursor = FillCursor::new();
        cursor.insert(&mut buffer, &layout, &bytes([0x0001, 0xFADE, 0xFFFF]));
        assert_eq!([0x0001, 0xFFFF, 0xFFFF], buffer[0..3]);
    }

    #[test]
    fn stops_when_full() {
        let (mut buffer, layout) = fresh(1024);
        let mut cursor = FillCursor::new();
        let payload = bytes(std::iter::repeat_n(0x1234, 1100));

        let consumed = cursor.insert(&mut buffer, &layout, &payload);
        assert_eq!(layout.capacity(buffer.len()), consumed);
        assert_eq!(1023, cursor.position());
        assert!(cursor.is_full(buffer.len()));
        assert_eq!(0, buffer[1023]);

        cursor.seal(&mut buffer, &layout);
        assert_eq!(0, cursor.position());
        assert_eq!(0xFADE, buffer[1023]);

        let rest = cursor.insert(&mut buffer, &layout, &payload[consumed * 2..]);
        assert_eq!(1100 - consumed, rest);
        assert_eq!(1100 - consumed, cursor.position());
    }

    #[test]
    fn pad() {
        let (mut buffer, layout) = fresh(1024);
        let mut cursor = FillCursor::new();
        cursor.insert(&mut buffer, &layout, &bytes(0..10));
        assert!(cursor.is_pending());

        cursor.pad(&mut buffer, &layout);
        assert!(cursor.is_full(buffer.len()));
        cursor.seal(&mut buffer, &layout);
        assert!(!cursor.is_pending());

        (0..10).for_each(|i| assert_eq!(i as u16, buffer[i]));
        assert!(buffer[10..].iter().all(|&w| w == 0xFADE));
    }

    #[test]
    fn reserved_at_start() {
        let layout = TelemetryLayout {
            reserved_start: 0,
            reserved_end: 3,
            ..TelemetryLayout::DEFAULT
        };
        let mut buffer = vec![0u16; 16];
        layout.scrub(&mut buffer);
        let mut cursor = FillCursor::new();
        assert_eq!(2, cursor.insert(&mut buffer, &layout, &bytes([7, 8])));
        assert_eq!(6, cursor.position());
        assert_eq!([0xFADE, 0xFADE, 0xFADE, 0xFADE, 7, 8], buffer[0..6]);
    }

    #[test]
    fn empty_payload() {
        let (mut buffer, layout) = fresh(1024);
        let mut cursor = FillCursor::new();
        assert_eq!(0, cursor.insert(&mut buffer, &layout, &[]));
        assert_eq!(0, cursor.position());
    }
}
