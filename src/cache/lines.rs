//! Line Reader Module
//!
//! Strict `\n`-terminated line reading for the journal.

use std::io::BufRead;

use crate::error::{CacheError, Result};

// == Line Reader ==
/// Reads `\n`-terminated UTF-8 lines.
///
/// A trailing `\r` is stripped. A final line without its terminator is not
/// returned; it is reported through [`LineReader::has_unterminated_line`]
/// so the caller can decide how to repair the file.
pub(crate) struct LineReader<R> {
    inner: R,
    scratch: Vec<u8>,
    unterminated: bool,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            scratch: Vec::with_capacity(80),
            unterminated: false,
        }
    }

    /// Returns the next complete line, or `None` at end of input.
    pub(crate) fn next_line(&mut self) -> Result<Option<String>> {
        if self.unterminated {
            return Ok(None);
        }

        self.scratch.clear();
        let n = self.inner.read_until(b'\n', &mut self.scratch)?;
        if n == 0 {
            return Ok(None);
        }
        if self.scratch.last() != Some(&b'\n') {
            self.unterminated = true;
            return Ok(None);
        }

        self.scratch.pop();
        if self.scratch.last() == Some(&b'\r') {
            self.scratch.pop();
        }
        let line = std::str::from_utf8(&self.scratch)
            .map_err(|_| CacheError::corrupt("journal line is not valid UTF-8"))?;
        Ok(Some(line.to_string()))
    }

    /// Reads a line that must exist, treating end of input as corruption.
    pub(crate) fn expect_line(&mut self, what: &str) -> Result<String> {
        self.next_line()?
            .ok_or_else(|| CacheError::corrupt(format!("journal ended before {}", what)))
    }

    /// True once a partial last line has been seen.
    pub(crate) fn has_unterminated_line(&self) -> bool {
        self.unterminated
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: &[u8]) -> LineReader<Cursor<Vec<u8>>> {
        LineReader::new(Cursor::new(data.to_vec()))
    }

    #[test]
    fn test_reads_terminated_lines() {
        let mut lines = reader(b"one\ntwo\r\n\nthree\n");
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("one"));
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("two"));
        assert_eq!(lines.next_line().unwrap().as_deref(), Some(""));
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("three"));
        assert_eq!(lines.next_line().unwrap(), None);
        assert!(!lines.has_unterminated_line());
    }

    #[test]
    fn test_unterminated_last_line_is_withheld() {
        let mut lines = reader(b"CLEAN a 1\nDIRTY b");
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("CLEAN a 1"));
        assert_eq!(lines.next_line().unwrap(), None);
        assert!(lines.has_unterminated_line());
        assert_eq!(lines.next_line().unwrap(), None);
    }

    #[test]
    fn test_invalid_utf8_is_corrupt() {
        let mut lines = reader(b"\xff\xfe\n");
        assert!(matches!(lines.next_line(), Err(CacheError::Corrupt(_))));
    }

    #[test]
    fn test_expect_line_at_eof_is_corrupt() {
        let mut lines = reader(b"");
        assert!(matches!(lines.expect_line("magic"), Err(CacheError::Corrupt(_))));
    }
}
