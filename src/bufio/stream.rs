//! Pooled Stream Module
//!
//! Read/write decorators whose internal buffer is borrowed from a
//! [`BufferPool`] and handed back when the stream is dropped.

use std::io::{self, BufRead, Read, Write};
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::bufio::BufferPool;

// == Pooled Buffered Reader ==
/// Buffered reader backed by a pooled buffer.
pub struct PooledBufReader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    filled: usize,
    pool: Arc<BufferPool>,
}

impl<R: Read> PooledBufReader<R> {
    /// Wraps `inner` with a buffer of at least `capacity` bytes taken from `pool`.
    pub fn with_capacity(capacity: usize, inner: R, pool: Arc<BufferPool>) -> Self {
        let buf = pool.acquire(capacity.max(1));
        Self {
            inner,
            buf,
            pos: 0,
            filled: 0,
            pool,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Capacity of the pooled buffer in use.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl<R: Read> Read for PooledBufReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        // Large reads bypass the buffer once it is drained.
        if self.pos == self.filled && out.len() >= self.buf.len() {
            return self.inner.read(out);
        }
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R: Read> BufRead for PooledBufReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.filled {
            self.filled = self.inner.read(&mut self.buf)?;
            self.pos = 0;
        }
        Ok(&self.buf[self.pos..self.filled])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.filled);
    }
}

impl<R> Drop for PooledBufReader<R> {
    fn drop(&mut self) {
        self.pool.release(mem::take(&mut self.buf));
    }
}

// == Pooled Buffered Writer ==
/// Buffered writer backed by a pooled buffer.
///
/// Pending bytes are flushed on drop; errors at that point are ignored, so
/// callers that care call [`Write::flush`] first.
pub struct PooledBufWriter<W: Write> {
    inner: W,
    buf: Vec<u8>,
    len: usize,
    pool: Arc<BufferPool>,
}

impl<W: Write> PooledBufWriter<W> {
    /// Wraps `inner` with a buffer of at least `capacity` bytes taken from `pool`.
    pub fn with_capacity(capacity: usize, inner: W, pool: Arc<BufferPool>) -> Self {
        let buf = pool.acquire(capacity.max(1));
        Self {
            inner,
            buf,
            len: 0,
            pool,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Bytes written but not yet handed to the inner writer.
    pub fn buffered(&self) -> usize {
        self.len
    }

    fn flush_buf(&mut self) -> io::Result<()> {
        if self.len == 0 {
            return Ok(());
        }
        let result = self.inner.write_all(&self.buf[..self.len]);
        self.len = 0;
        result
    }
}

impl<W: Write> Write for PooledBufWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.len + data.len() > self.buf.len() {
            self.flush_buf()?;
        }
        if data.len() >= self.buf.len() {
            return self.inner.write(data);
        }
        self.buf[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buf()?;
        self.inner.flush()
    }
}

impl<W: Write> Drop for PooledBufWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush_buf();
        self.pool.release(mem::take(&mut self.buf));
    }
}

// == Fault Hiding Writer ==
/// Writer that never reports errors to its caller.
///
/// Any failure of the inner writer (including the final flush on drop) is
/// recorded in the shared `has_errors` flag instead.
pub struct FaultHidingWriter<W: Write> {
    inner: W,
    has_errors: Arc<AtomicBool>,
}

impl<W: Write> FaultHidingWriter<W> {
    pub fn new(inner: W, has_errors: Arc<AtomicBool>) -> Self {
        Self { inner, has_errors }
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors.load(Ordering::Acquire)
    }

    fn mark_failed(&self) {
        self.has_errors.store(true, Ordering::Release);
    }
}

impl<W: Write> Write for FaultHidingWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self.inner.write(data) {
            Ok(n) => Ok(n),
            Err(_) => {
                self.mark_failed();
                Ok(data.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.inner.flush().is_err() {
            self.mark_failed();
        }
        Ok(())
    }
}

impl<W: Write> Drop for FaultHidingWriter<W> {
    fn drop(&mut self) {
        if self.inner.flush().is_err() {
            self.mark_failed();
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_reader_returns_buffer_on_drop() {
        let pool = Arc::new(BufferPool::new(1024));
        {
            let mut reader =
                PooledBufReader::with_capacity(16, Cursor::new(b"hello world".to_vec()), pool.clone());
            let mut out = String::new();
            reader.read_to_string(&mut out).unwrap();
            assert_eq!(out, "hello world");
            assert_eq!(pool.buffer_count(), 0);
        }
        assert_eq!(pool.buffer_count(), 1);
        assert_eq!(pool.retained_bytes(), 16);
    }

    #[test]
    fn test_reader_lines_across_refills() {
        let pool = Arc::new(BufferPool::new(1024));
        let data = b"first line\nsecond line\nthird\n".to_vec();
        let reader = PooledBufReader::with_capacity(4, Cursor::new(data), pool);
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["first line", "second line", "third"]);
    }

    #[test]
    fn test_reader_reuses_pooled_buffer() {
        let pool = Arc::new(BufferPool::new(1024));
        pool.release(vec![0u8; 64]);
        let reader = PooledBufReader::with_capacity(32, Cursor::new(Vec::new()), pool.clone());
        assert_eq!(reader.capacity(), 64);
        assert_eq!(pool.buffer_count(), 0);
    }

    #[test]
    fn test_writer_buffers_until_flush() {
        let pool = Arc::new(BufferPool::new(1024));
        let mut writer = PooledBufWriter::with_capacity(16, Vec::new(), pool.clone());
        writer.write_all(b"abc").unwrap();
        assert_eq!(writer.buffered(), 3);
        assert!(writer.get_ref().is_empty());

        writer.flush().unwrap();
        assert_eq!(writer.get_ref(), b"abc");
        assert_eq!(writer.buffered(), 0);
    }

    #[test]
    fn test_writer_large_write_bypasses_buffer() {
        let pool = Arc::new(BufferPool::new(1024));
        let mut writer = PooledBufWriter::with_capacity(4, Vec::new(), pool);
        writer.write_all(b"ab").unwrap();
        writer.write_all(b"0123456789").unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.get_ref(), b"ab0123456789");
    }

    #[test]
    fn test_writer_returns_buffer_on_drop() {
        let pool = Arc::new(BufferPool::new(1024));
        let writer = PooledBufWriter::with_capacity(32, Vec::new(), pool.clone());
        drop(writer);
        assert_eq!(pool.buffer_count(), 1);
    }

    #[test]
    fn test_fault_hiding_swallows_errors() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut writer = FaultHidingWriter::new(FailingWriter, flag.clone());
        assert_eq!(writer.write(b"data").unwrap(), 4);
        assert!(writer.flush().is_ok());
        assert!(writer.has_errors());
        drop(writer);
        assert!(flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_fault_hiding_detects_error_on_drop_flush() {
        let pool = Arc::new(BufferPool::new(1024));
        let flag = Arc::new(AtomicBool::new(false));
        {
            let inner = PooledBufWriter::with_capacity(64, FailingWriter, pool);
            let mut writer = FaultHidingWriter::new(inner, flag.clone());
            // Fits in the buffer, so no error yet
            writer.write_all(b"pending").unwrap();
            assert!(!writer.has_errors());
        }
        assert!(flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_fault_hiding_passes_through_on_success() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut writer = FaultHidingWriter::new(Vec::new(), flag.clone());
        writer.write_all(b"ok").unwrap();
        drop(writer);
        assert!(!flag.load(Ordering::Acquire));
    }
}
