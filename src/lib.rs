//! Journal Cache - a size-bounded LRU cache on disk
//!
//! Each key maps to a fixed number of byte values stored as files. An
//! append-only journal records every change so the cache survives restarts
//! and crashes.

pub mod bufio;
pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use bufio::BufferPool;
pub use cache::{CacheStats, DiskCache, Editor, Snapshot, ValueReader, ValueWriter};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::PendingCache;
