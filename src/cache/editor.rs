//! Editor Module
//!
//! Transactional write handle for one entry.

use std::fs::File;
use std::io::{self, Read, Write};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::bufio::{FaultHidingWriter, PooledBufReader, PooledBufWriter};
use crate::cache::entry::EditorId;
use crate::cache::snapshot::ValueReader;
use crate::cache::store::Completion;
use crate::cache::DiskCache;
use crate::error::{CacheError, Result};

// == Editor ==
/// Edits the values of one entry.
///
/// Values are written to dirty files and only become visible when
/// [`Editor::commit`] renames them into place. [`Editor::abort`] (or dropping
/// the editor) discards them. At most one editor exists per key.
pub struct Editor {
    cache: DiskCache,
    key: String,
    id: EditorId,
    /// Slots given a value during this edit, tracked for first publishes
    written: Vec<bool>,
    has_errors: Arc<AtomicBool>,
    done: bool,
}

impl Editor {
    pub(crate) fn new(cache: DiskCache, key: String, id: EditorId) -> Self {
        let value_count = cache.inner.value_count;
        Self {
            cache,
            key,
            id,
            written: vec![false; value_count],
            has_errors: Arc::new(AtomicBool::new(false)),
            done: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    // == Output Stream ==
    /// Returns a writer that replaces the value at `index`.
    ///
    /// Write errors are never returned by the writer; they make the
    /// eventual [`Editor::commit`] fail instead. The writer borrows the
    /// editor, so it has to be dropped before committing.
    pub fn new_output_stream(&mut self, index: usize) -> Result<ValueWriter<'_>> {
        let inner = &self.cache.inner;
        let (file, readable) = inner.open_dirty_file(&self.key, self.id, index)?;
        if !readable {
            self.written[index] = true;
        }

        let target = match file {
            Some(file) => Target::File(PooledBufWriter::with_capacity(
                inner.buffer_size,
                file,
                Arc::clone(&inner.pool),
            )),
            None => {
                self.has_errors.store(true, Ordering::Release);
                Target::Sink(io::sink())
            }
        };

        Ok(ValueWriter {
            inner: FaultHidingWriter::new(target, Arc::clone(&self.has_errors)),
            _editor: PhantomData,
        })
    }

    // == Input Stream ==
    /// Returns a reader over the last committed value at `index`, or `None`
    /// if the entry has never been committed.
    pub fn new_input_stream(&self, index: usize) -> Result<Option<ValueReader>> {
        let inner = &self.cache.inner;
        let file = inner.open_clean_file(&self.key, self.id, index)?;
        Ok(file.map(|file| {
            PooledBufReader::with_capacity(inner.buffer_size, file, Arc::clone(&inner.pool))
        }))
    }

    /// Writes `value` as the whole value at `index`.
    pub fn set(&mut self, index: usize, value: &str) -> Result<()> {
        let mut writer = self.new_output_stream(index)?;
        writer.write_all(value.as_bytes())?;
        Ok(())
    }

    /// Reads the last committed value at `index` as UTF-8.
    pub fn get_string(&self, index: usize) -> Result<Option<String>> {
        let Some(mut reader) = self.new_input_stream(index)? else {
            return Ok(None);
        };
        let mut value = String::new();
        reader.read_to_string(&mut value)?;
        Ok(Some(value))
    }

    // == Commit ==
    /// Publishes the written values.
    ///
    /// Slots that were not written keep their previous value. The first
    /// commit of an entry must write every slot or it fails with
    /// [`CacheError::MissingValue`] and is aborted. If any write failed the
    /// edit is aborted, the entry removed, and [`CacheError::EditFailed`]
    /// returned. A value that cannot be moved into place drops the entry
    /// and returns the I/O error. The key is free to edit again afterwards
    /// in every case.
    pub fn commit(mut self) -> Result<()> {
        self.done = true;
        let completion = if self.has_errors.load(Ordering::Acquire) {
            Completion::Discard
        } else {
            Completion::Commit
        };
        self.cache
            .inner
            .complete_edit(&self.key, self.id, &self.written, completion)
    }

    // == Abort ==
    /// Discards the written values; the previous state of the entry stands.
    pub fn abort(mut self) -> Result<()> {
        self.done = true;
        self.cache
            .inner
            .complete_edit(&self.key, self.id, &self.written, Completion::Abort)
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        match self
            .cache
            .inner
            .complete_edit(&self.key, self.id, &self.written, Completion::Abort)
        {
            Ok(()) | Err(CacheError::StaleEditor(_)) | Err(CacheError::Closed) => {}
            Err(err) => warn!("Failed to abort abandoned edit of {}: {}", self.key, err),
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}

// == Value Writer ==
/// Writer for one value slot of an [`Editor`].
pub struct ValueWriter<'a> {
    inner: FaultHidingWriter<Target>,
    _editor: PhantomData<&'a mut Editor>,
}

impl Write for ValueWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.inner.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

enum Target {
    File(PooledBufWriter<File>),
    Sink(io::Sink),
}

impl Write for Target {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self {
            Target::File(writer) => writer.write(data),
            Target::Sink(sink) => sink.write(data),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Target::File(writer) => writer.flush(),
            Target::Sink(sink) => sink.flush(),
        }
    }
}
