//! Buffered I/O Module
//!
//! Size-tiered byte buffer pool and the buffered stream decorators that
//! borrow their buffers from it.

mod pool;
mod stream;

pub use pool::BufferPool;
pub use stream::{FaultHidingWriter, PooledBufReader, PooledBufWriter};
