//! Record framing for the serial link
//!
//! Records are separated by `\n`. A trailing `\r` is stripped and blank
//! lines are skipped. A line longer than [`MAX_RECORD_LEN`] is discarded
//! up to the next newline so the parser resynchronizes on the following
//! record.

use heapless::Vec;

use crate::ProtocolError;

/// Maximum record length in bytes, excluding the newline
pub const MAX_RECORD_LEN: usize = 2048;

/// Byte-at-a-time line assembler
#[derive(Debug, Clone)]
pub struct LineAssembler {
    buffer: Vec<u8, MAX_RECORD_LEN>,
    discarding: bool,
    /// Buffer holds a record already handed out
    ready: bool,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAssembler {
    /// Create an empty assembler
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
            ready: false,
        }
    }

    /// Drop any partial record
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
        self.ready = false;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(record))` when a complete non-empty record is
    /// available, `Ok(None)` when more bytes are needed, and
    /// `Err(TooLong)` once for each overlong line (reported at its newline).
    pub fn feed(&mut self, byte: u8) -> Result<Option<&[u8]>, ProtocolError> {
        if self.ready {
            self.buffer.clear();
            self.ready = false;
        }

        if byte == b'\n' {
            if self.discarding {
                self.reset();
                return Err(ProtocolError::TooLong);
            }
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
            if self.buffer.is_empty() {
                return Ok(None);
            }
            // Cleared on the next byte so the slice can be returned
            self.ready = true;
            return Ok(Some(&self.buffer));
        }

        if self.discarding {
            return Ok(None);
        }

        if self.buffer.push(byte).is_err() {
            self.buffer.clear();
            self.discarding = true;
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Records = heapless::Vec<heapless::Vec<u8, 64>, 8>;

    fn collect(assembler: &mut LineAssembler, input: &[u8]) -> Records {
        let mut out = heapless::Vec::new();
        for &b in input {
            if let Ok(Some(record)) = assembler.feed(b) {
                let mut owned = heapless::Vec::new();
                owned.extend_from_slice(record).unwrap();
                out.push(owned).unwrap();
            }
        }
        out
    }

    #[test]
    fn test_splits_records() {
        let mut assembler = LineAssembler::new();
        let records = collect(&mut assembler, b"{\"a\":1}\n{\"b\":2}\r\n");
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][..], b"{\"a\":1}");
        assert_eq!(&records[1][..], b"{\"b\":2}");
    }

    #[test]
    fn test_skips_blank_lines() {
        let mut assembler = LineAssembler::new();
        let records = collect(&mut assembler, b"\n\r\n\nx\n");
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][..], b"x");
    }

    #[test]
    fn test_partial_record_waits() {
        let mut assembler = LineAssembler::new();
        assert!(collect(&mut assembler, b"{\"cmd\":").is_empty());
        let records = collect(&mut assembler, b"1}\n");
        assert_eq!(&records[0][..], b"{\"cmd\":1}");
    }

    #[test]
    fn test_overlong_line_is_discarded_and_resyncs() {
        let mut assembler = LineAssembler::new();
        for _ in 0..MAX_RECORD_LEN + 10 {
            assert_eq!(assembler.feed(b'x'), Ok(None));
        }
        assert_eq!(assembler.feed(b'\n'), Err(ProtocolError::TooLong));

        let records = collect(&mut assembler, b"ok\n");
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][..], b"ok");
    }
}
