//! Snapshot Module
//!
//! Point-in-time view of an entry's values.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::bufio::PooledBufReader;
use crate::cache::editor::Editor;
use crate::cache::DiskCache;
use crate::error::{CacheError, Result};

/// Buffered reader over one committed value file.
pub type ValueReader = PooledBufReader<File>;

// == Snapshot ==
/// The values of one entry as they were when [`DiskCache::get`] returned.
///
/// Every value file is already open, so later commits or removals of the
/// same key do not change what this snapshot reads.
pub struct Snapshot {
    cache: DiskCache,
    key: String,
    sequence_number: u64,
    readers: Vec<ValueReader>,
    paths: Vec<PathBuf>,
    lengths: Vec<u64>,
}

impl Snapshot {
    pub(crate) fn new(
        cache: DiskCache,
        key: String,
        sequence_number: u64,
        readers: Vec<ValueReader>,
        paths: Vec<PathBuf>,
        lengths: Vec<u64>,
    ) -> Self {
        Self {
            cache,
            key,
            sequence_number,
            readers,
            paths,
            lengths,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reader over the value at `index`.
    pub fn input_stream(&mut self, index: usize) -> Result<&mut ValueReader> {
        let value_count = self.readers.len();
        self.readers
            .get_mut(index)
            .ok_or(CacheError::IndexOutOfRange { index, value_count })
    }

    /// Reads the rest of the value at `index` as UTF-8.
    pub fn get_string(&mut self, index: usize) -> Result<String> {
        let mut value = String::new();
        self.input_stream(index)?.read_to_string(&mut value)?;
        Ok(value)
    }

    /// Byte length of the value at `index` when the snapshot was taken.
    pub fn length(&self, index: usize) -> Option<u64> {
        self.lengths.get(index).copied()
    }

    /// Path of the committed file backing the value at `index`.
    pub fn path(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    /// Starts an edit of this entry, or returns `None` if the entry changed
    /// since the snapshot was taken or another edit is in progress.
    pub fn edit(&self) -> Result<Option<Editor>> {
        self.cache.edit_at(&self.key, Some(self.sequence_number))
    }

    /// Gives up the snapshot, keeping its open readers.
    pub fn into_readers(self) -> Vec<ValueReader> {
        self.readers
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("key", &self.key)
            .field("sequence_number", &self.sequence_number)
            .field("lengths", &self.lengths)
            .finish()
    }
}
