//! Cache Module
//!
//! Journal-backed LRU cache stored as plain files in one directory.

mod editor;
mod entry;
mod journal;
mod lines;
mod lru;
mod snapshot;
mod stats;
mod store;


pub use editor::{Editor, ValueWriter};
pub use entry::validate_key;
pub use snapshot::{Snapshot, ValueReader};
pub use stats::CacheStats;
pub use store::DiskCache;

pub(crate) use store::Inner;

/// Name of the journal file inside the cache directory.
pub const JOURNAL_FILE: &str = "journal";
/// Scratch file a rebuilt journal is written to before replacing the journal.
pub const JOURNAL_FILE_TEMP: &str = "journal.tmp";

pub(crate) const MAGIC: &str = "libcore.io.DiskLruCache";
pub(crate) const VERSION: &str = "1";
