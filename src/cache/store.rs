//! Disk Cache Module
//!
//! The cache engine: entry table, size accounting and journal behind one
//! engine-wide lock, plus the public `DiskCache` handle.
//!
//! Metadata changes and journal appends happen under the lock. Value bytes
//! are streamed through files opened under the lock but read and written
//! outside it.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::bufio::{BufferPool, PooledBufReader};
use crate::cache::editor::Editor;
use crate::cache::entry::{validate_key, EditorId, Entry};
use crate::cache::journal::{self, JournalHeader, JournalRecord, JournalWriter};
use crate::cache::lru::EntryTable;
use crate::cache::snapshot::{Snapshot, ValueReader};
use crate::cache::stats::CacheStats;
use crate::cache::{JOURNAL_FILE, JOURNAL_FILE_TEMP};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_maintenance_worker, spawn_open, MaintenanceQueue, PendingCache};

// == Disk Cache ==
/// A size-bounded, journal-backed disk cache.
///
/// Each key maps to `value_count` byte streams stored as files in the cache
/// directory. Cloning is cheap and every clone refers to the same cache.
///
/// The directory must be owned by a single `DiskCache` at a time; two caches
/// over the same directory are not detected and will corrupt each other.
#[derive(Clone)]
pub struct DiskCache {
    pub(crate) inner: Arc<Inner>,
}

/// Shared engine state.
pub(crate) struct Inner {
    pub(crate) directory: PathBuf,
    journal_path: PathBuf,
    journal_tmp_path: PathBuf,
    header: JournalHeader,
    pub(crate) value_count: usize,
    compact_threshold: usize,
    pub(crate) buffer_size: usize,
    pub(crate) pool: Arc<BufferPool>,
    state: Mutex<State>,
    maintenance: MaintenanceQueue,
}

/// Everything guarded by the engine-wide lock.
struct State {
    entries: EntryTable,
    size: u64,
    max_size: u64,
    /// `None` once the cache is closed
    journal: Option<JournalWriter>,
    redundant_op_count: usize,
    next_sequence_number: u64,
    next_editor_id: EditorId,
    stats: CacheStats,
}

/// How an edit ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    /// Publish the written values
    Commit,
    /// Drop the written values, keep the previous ones
    Abort,
    /// Drop the written values and the entry; reports `EditFailed`
    Discard,
}

/// Outcome of one maintenance pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MaintenanceReport {
    pub evicted: usize,
    pub rebuilt: bool,
}

/// Entries, size and writer recovered from an existing journal.
struct Recovered {
    entries: EntryTable,
    size: u64,
    journal: JournalWriter,
    redundant_op_count: usize,
}

impl DiskCache {
    // == Open ==
    /// Opens the cache in `config.directory`, creating it if needed.
    ///
    /// An existing journal is replayed. A journal that was written for a
    /// different app version or value count, or that cannot be parsed, is
    /// treated as corrupt: the directory is wiped and the cache starts empty.
    pub fn open(config: CacheConfig) -> Result<Self> {
        let pool = Arc::new(BufferPool::new(config.pool_limit));
        Self::open_with_pool(config, pool)
    }

    /// Like [`DiskCache::open`], sharing an existing buffer pool.
    pub fn open_with_pool(config: CacheConfig, pool: Arc<BufferPool>) -> Result<Self> {
        config.validate()?;

        let directory = config.directory.clone();
        let journal_path = directory.join(JOURNAL_FILE);
        let journal_tmp_path = directory.join(JOURNAL_FILE_TEMP);
        let header = JournalHeader {
            app_version: config.app_version,
            value_count: config.value_count,
        };

        let mut stats = CacheStats::new();
        let mut recovered = None;
        if journal_path.exists() {
            match recover(
                &directory,
                &journal_path,
                &journal_tmp_path,
                &header,
                &pool,
                config.buffer_size,
            ) {
                Ok(found) => recovered = Some(found),
                Err(err) => {
                    warn!(
                        "Cache {} journal is corrupt: {}, removing",
                        directory.display(),
                        err
                    );
                    delete_directory(&directory)?;
                    stats.record_corruption_recovery();
                }
            }
        }

        let recovered = match recovered {
            Some(found) => found,
            None => {
                fs::create_dir_all(&directory)?;
                let entries = EntryTable::new();
                let journal = journal::rebuild(
                    &journal_path,
                    &journal_tmp_path,
                    &header,
                    &entries,
                    &pool,
                    config.buffer_size,
                )?;
                Recovered {
                    entries,
                    size: 0,
                    journal,
                    redundant_op_count: 0,
                }
            }
        };

        info!(
            "Opened cache {}: {} entries, {} of {} bytes",
            directory.display(),
            recovered.entries.len(),
            recovered.size,
            config.max_size
        );

        let (maintenance, requests) = MaintenanceQueue::new();
        let inner = Arc::new(Inner {
            directory,
            journal_path,
            journal_tmp_path,
            header,
            value_count: config.value_count,
            compact_threshold: config.compact_threshold,
            buffer_size: config.buffer_size,
            pool,
            state: Mutex::new(State {
                entries: recovered.entries,
                size: recovered.size,
                max_size: config.max_size,
                journal: Some(recovered.journal),
                redundant_op_count: recovered.redundant_op_count,
                next_sequence_number: 1,
                next_editor_id: 1,
                stats,
            }),
            maintenance,
        });
        spawn_maintenance_worker(Arc::downgrade(&inner), requests)?;

        let cache = DiskCache { inner };
        {
            // A replayed cache may already be over budget or due for compaction.
            let state = cache.inner.state.lock();
            if state.size > state.max_size || cache.inner.rebuild_required(&state) {
                cache.inner.maintenance.request();
            }
        }
        Ok(cache)
    }

    /// Opens the cache on Tokio's blocking pool.
    ///
    /// Must be called from within a Tokio runtime. The returned handle
    /// reports [`CacheError::NotReady`] until the journal has been replayed.
    pub fn open_async(config: CacheConfig) -> PendingCache {
        spawn_open(config)
    }

    // == Get ==
    /// Returns a snapshot of the entry for `key`, or `None` on a miss.
    ///
    /// All value files are opened before returning, so the snapshot never
    /// mixes values from different commits. A value file that vanished
    /// behind the cache's back turns the lookup into a miss.
    pub fn get(&self, key: &str) -> Result<Option<Snapshot>> {
        validate_key(key)?;
        let inner = &self.inner;
        let mut state = inner.state.lock();
        state.ensure_open()?;

        let found = state
            .entries
            .touch(key)
            .filter(|entry| entry.readable)
            .map(|entry| (entry.sequence_number, entry.lengths.clone()));
        let Some((sequence_number, lengths)) = found else {
            state.stats.record_miss();
            return Ok(None);
        };

        let mut readers: Vec<ValueReader> = Vec::with_capacity(inner.value_count);
        let mut paths = Vec::with_capacity(inner.value_count);
        for index in 0..inner.value_count {
            let path = inner.clean_file(key, index);
            match File::open(&path) {
                Ok(file) => readers.push(PooledBufReader::with_capacity(
                    inner.buffer_size,
                    file,
                    Arc::clone(&inner.pool),
                )),
                Err(err) => {
                    debug!("Miss on {}: cannot open {}: {}", key, path.display(), err);
                    state.stats.record_miss();
                    return Ok(None);
                }
            }
            paths.push(path);
        }

        state.redundant_op_count += 1;
        state.append(&JournalRecord::Read(key.to_string()))?;
        state.stats.record_hit();
        if inner.rebuild_required(&state) {
            inner.maintenance.request();
        }
        drop(state);

        Ok(Some(Snapshot::new(
            self.clone(),
            key.to_string(),
            sequence_number,
            readers,
            paths,
            lengths,
        )))
    }

    // == Edit ==
    /// Starts an edit of `key`.
    ///
    /// Returns `None` if another editor for `key` is still open. The `DIRTY`
    /// record is flushed to the journal before this returns.
    pub fn edit(&self, key: &str) -> Result<Option<Editor>> {
        self.edit_at(key, None)
    }

    /// Starts an edit only if the entry's sequence number still matches.
    pub(crate) fn edit_at(&self, key: &str, expected_sequence: Option<u64>) -> Result<Option<Editor>> {
        validate_key(key)?;
        let inner = &self.inner;
        let mut state = inner.state.lock();
        state.ensure_open()?;

        // Refusals leave recency alone.
        match (state.entries.peek(key), expected_sequence) {
            (Some(entry), _) if entry.is_being_edited() => return Ok(None),
            (Some(entry), Some(expected)) if entry.sequence_number != expected => {
                return Ok(None)
            }
            (None, Some(_)) => return Ok(None),
            _ => {}
        }

        let editor_id = state.next_editor_id;
        state.entries.get_or_create(key, inner.value_count).current_editor = Some(editor_id);
        state.next_editor_id += 1;

        // Publish the dirty key before handing out the editor.
        let logged = state
            .append(&JournalRecord::Dirty(key.to_string()))
            .and_then(|()| state.flush_journal());
        if let Err(err) = logged {
            if let Some(entry) = state.entries.peek_mut(key) {
                entry.current_editor = None;
                if !entry.readable {
                    state.entries.remove(key);
                }
            }
            return Err(err);
        }
        drop(state);

        Ok(Some(Editor::new(self.clone(), key.to_string(), editor_id)))
    }

    // == Remove ==
    /// Removes the entry for `key` and deletes its value files.
    ///
    /// Returns `false` if there is no such entry or it is being edited.
    pub fn remove(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        let mut state = self.inner.state.lock();
        state.ensure_open()?;
        state.remove_entry(&self.inner, key)
    }

    // == Flush ==
    /// Trims to size and flushes the journal.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.inner.state.lock();
        state.ensure_open()?;
        state.trim_to_size(&self.inner)?;
        state.flush_journal()
    }

    // == Close ==
    /// Aborts in-flight edits, trims to size and closes the journal.
    ///
    /// Closing twice is a no-op. Every other operation fails with
    /// [`CacheError::Closed`] afterwards.
    pub fn close(&self) -> Result<()> {
        let inner = &self.inner;
        let mut state = inner.state.lock();
        if state.journal.is_none() {
            return Ok(());
        }

        for (key, editor_id) in state.entries.in_flight_edits() {
            if let Err(err) = state.complete_edit(inner, &key, editor_id, &[], Completion::Abort) {
                warn!("Abort of {} on close incomplete: {}", key, err);
            }
        }
        state.trim_to_size(inner)?;
        state.flush_journal()?;
        state.journal = None;

        info!("Closed cache {}", inner.directory.display());
        Ok(())
    }

    // == Delete ==
    /// Closes the cache and deletes the cache directory with everything in
    /// it, including files the cache did not create.
    pub fn delete(&self) -> Result<()> {
        self.close()?;
        delete_directory(&self.inner.directory)
    }

    // == Accessors ==
    /// Bytes of committed values currently stored.
    pub fn size(&self) -> u64 {
        self.inner.state.lock().size
    }

    pub fn max_size(&self) -> u64 {
        self.inner.state.lock().max_size
    }

    /// Changes the byte budget and schedules a trim.
    pub fn set_max_size(&self, max_size: u64) {
        self.inner.state.lock().max_size = max_size;
        self.inner.maintenance.request();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().journal.is_none()
    }

    /// Number of entries in the table, including edits in flight.
    pub fn len(&self) -> usize {
        self.inner.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn directory(&self) -> &Path {
        &self.inner.directory
    }

    pub fn value_count(&self) -> usize {
        self.inner.value_count
    }

    pub fn buffer_pool(&self) -> &Arc<BufferPool> {
        &self.inner.pool
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let state = self.inner.state.lock();
        let mut stats = state.stats.clone();
        stats.total_entries = state.entries.len();
        stats.size = state.size;
        stats.max_size = state.max_size;
        stats
    }
}

impl fmt::Debug for DiskCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskCache")
            .field("directory", &self.inner.directory)
            .field("value_count", &self.inner.value_count)
            .finish()
    }
}

impl Inner {
    pub(crate) fn clean_file(&self, key: &str, index: usize) -> PathBuf {
        self.directory.join(format!("{}.{}", key, index))
    }

    pub(crate) fn dirty_file(&self, key: &str, index: usize) -> PathBuf {
        self.directory.join(format!("{}.{}.tmp", key, index))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.value_count {
            return Err(CacheError::IndexOutOfRange {
                index,
                value_count: self.value_count,
            });
        }
        Ok(())
    }

    /// Compaction pays off once redundant lines reach the threshold and
    /// outnumber live entries.
    fn rebuild_required(&self, state: &State) -> bool {
        state.redundant_op_count >= self.compact_threshold
            && state.redundant_op_count >= state.entries.len()
    }

    // == Editor Support ==
    /// Opens the dirty file for slot `index`.
    ///
    /// Returns `None` when the file cannot be created even after recreating
    /// the directory, and whether the entry was readable at that point.
    pub(crate) fn open_dirty_file(
        &self,
        key: &str,
        editor_id: EditorId,
        index: usize,
    ) -> Result<(Option<File>, bool)> {
        self.check_index(index)?;
        let state = self.state.lock();
        let readable = state.current_entry(key, editor_id)?.readable;

        let path = self.dirty_file(key, index);
        let open = || {
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
        };
        let file = match open() {
            Ok(file) => Some(file),
            Err(_) => {
                // The directory may have been removed underneath us.
                match fs::create_dir_all(&self.directory).and_then(|()| open()) {
                    Ok(file) => Some(file),
                    Err(err) => {
                        warn!("Cannot create {}: {}", path.display(), err);
                        None
                    }
                }
            }
        };
        Ok((file, readable))
    }

    /// Opens the committed file for slot `index`, if the entry is readable.
    pub(crate) fn open_clean_file(
        &self,
        key: &str,
        editor_id: EditorId,
        index: usize,
    ) -> Result<Option<File>> {
        self.check_index(index)?;
        let state = self.state.lock();
        if !state.current_entry(key, editor_id)?.readable {
            return Ok(None);
        }
        match File::open(self.clean_file(key, index)) {
            Ok(file) => Ok(Some(file)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Ends the edit held by `editor_id`.
    pub(crate) fn complete_edit(
        &self,
        key: &str,
        editor_id: EditorId,
        written: &[bool],
        completion: Completion,
    ) -> Result<()> {
        let mut state = self.state.lock();
        state.complete_edit(self, key, editor_id, written, completion)
    }

    // == Maintenance ==
    /// Trims to size and compacts the journal if needed.
    ///
    /// Does nothing once the cache is closed.
    pub(crate) fn run_maintenance(&self) -> Result<MaintenanceReport> {
        let mut state = self.state.lock();
        if state.journal.is_none() {
            return Ok(MaintenanceReport::default());
        }

        let evicted = state.trim_to_size(self)?;
        let rebuilt = if self.rebuild_required(&state) {
            state.rebuild_journal(self)?;
            true
        } else {
            false
        };
        Ok(MaintenanceReport { evicted, rebuilt })
    }
}

impl State {
    fn ensure_open(&self) -> Result<()> {
        if self.journal.is_none() {
            return Err(CacheError::Closed);
        }
        Ok(())
    }

    fn append(&mut self, record: &JournalRecord) -> Result<()> {
        self.journal.as_mut().ok_or(CacheError::Closed)?.append(record)
    }

    fn flush_journal(&mut self) -> Result<()> {
        self.journal.as_mut().ok_or(CacheError::Closed)?.flush()
    }

    /// The entry for `key`, provided `editor_id` still holds it.
    fn current_entry(&self, key: &str, editor_id: EditorId) -> Result<&Entry> {
        match self.entries.peek(key) {
            Some(entry) if entry.current_editor == Some(editor_id) => Ok(entry),
            _ => Err(CacheError::StaleEditor(key.to_string())),
        }
    }

    /// Ends the edit held by `editor_id`.
    ///
    /// The editor is released on every path that gets past the ownership
    /// check, including failed commits and failed cleanups.
    fn complete_edit(
        &mut self,
        inner: &Inner,
        key: &str,
        editor_id: EditorId,
        written: &[bool],
        completion: Completion,
    ) -> Result<()> {
        let readable = self.current_entry(key, editor_id)?.readable;

        match completion {
            Completion::Commit => self.publish_edit(inner, key, written, readable),
            Completion::Abort => self.abort_edit(inner, key),
            Completion::Discard => {
                if let Err(err) = self.abort_edit(inner, key) {
                    warn!("Cleanup of failed edit of {} incomplete: {}", key, err);
                }
                if let Err(err) = self.remove_entry(inner, key) {
                    warn!("Cannot remove {} after failed edit: {}", key, err);
                }
                Err(CacheError::EditFailed(key.to_string()))
            }
        }
    }

    fn publish_edit(
        &mut self,
        inner: &Inner,
        key: &str,
        written: &[bool],
        readable: bool,
    ) -> Result<()> {
        // A first publish needs a value for every slot.
        if !readable {
            for index in 0..inner.value_count {
                let created = written.get(index).copied().unwrap_or(false)
                    && inner.dirty_file(key, index).exists();
                if !created {
                    self.abort_edit(inner, key)?;
                    return Err(CacheError::MissingValue {
                        key: key.to_string(),
                        index,
                    });
                }
            }
        }

        let mut published = Vec::with_capacity(inner.value_count);
        for index in 0..inner.value_count {
            let dirty = inner.dirty_file(key, index);
            if !dirty.exists() {
                continue;
            }
            let clean = inner.clean_file(key, index);
            let renamed = fs::rename(&dirty, &clean)
                .and_then(|()| fs::metadata(&clean))
                .map(|metadata| metadata.len());
            match renamed {
                Ok(length) => published.push((index, length)),
                Err(err) => {
                    // Slots renamed so far replaced the old values, so the
                    // entry cannot fall back to them.
                    warn!("Cannot publish {}: {}, dropping entry", clean.display(), err);
                    if let Err(cleanup) = self.abort_edit(inner, key) {
                        warn!("Cleanup of failed edit of {} incomplete: {}", key, cleanup);
                    }
                    for (index, _) in &published {
                        let orphan = inner.clean_file(key, *index);
                        if let Err(cleanup) = delete_if_exists(&orphan) {
                            warn!("Cannot delete {}: {}", orphan.display(), cleanup);
                        }
                    }
                    if let Err(cleanup) = self.remove_entry(inner, key) {
                        warn!("Cannot remove {} after failed publish: {}", key, cleanup);
                    }
                    return Err(err.into());
                }
            }
        }

        let Some(entry) = self.entries.peek_mut(key) else {
            return Err(CacheError::StaleEditor(key.to_string()));
        };
        for (index, length) in published {
            let old_length = entry.lengths[index];
            entry.lengths[index] = length;
            self.size = self.size - old_length + length;
        }
        self.release_editor(inner, key, true)
    }

    /// Deletes every dirty file of `key`, then releases the editor. The first
    /// delete failure is returned after the release.
    fn abort_edit(&mut self, inner: &Inner, key: &str) -> Result<()> {
        let mut first_error = None;
        for index in 0..inner.value_count {
            let dirty = inner.dirty_file(key, index);
            if let Err(err) = delete_if_exists(&dirty) {
                warn!("Cannot delete {}: {}", dirty.display(), err);
                first_error.get_or_insert(err);
            }
        }

        self.release_editor(inner, key, false)?;
        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Clears the editor and logs the outcome: `CLEAN` if the entry has
    /// values, `REMOVE` (and the entry dropped) otherwise.
    fn release_editor(&mut self, inner: &Inner, key: &str, published: bool) -> Result<()> {
        let Some(entry) = self.entries.peek_mut(key) else {
            return Err(CacheError::StaleEditor(key.to_string()));
        };
        entry.current_editor = None;
        self.redundant_op_count += 1;

        let record = if entry.readable || published {
            entry.readable = true;
            if published {
                entry.sequence_number = self.next_sequence_number;
                self.next_sequence_number += 1;
            }
            JournalRecord::clean(entry)
        } else {
            self.entries.remove(key);
            JournalRecord::Remove(key.to_string())
        };
        self.append(&record)?;
        self.flush_journal()?;

        if self.size > self.max_size || inner.rebuild_required(self) {
            inner.maintenance.request();
        }
        Ok(())
    }

    /// Deletes the value files of `key` and drops the entry.
    fn remove_entry(&mut self, inner: &Inner, key: &str) -> Result<bool> {
        let Some(entry) = self.entries.peek_mut(key) else {
            return Ok(false);
        };
        if entry.is_being_edited() {
            return Ok(false);
        }

        for index in 0..inner.value_count {
            let clean = inner.clean_file(key, index);
            delete_if_exists(&clean).map_err(|err| {
                CacheError::Io(io::Error::new(
                    err.kind(),
                    format!("failed to delete {}: {}", clean.display(), err),
                ))
            })?;
            self.size -= entry.lengths[index];
            entry.lengths[index] = 0;
        }

        self.redundant_op_count += 1;
        self.entries.remove(key);
        self.append(&JournalRecord::Remove(key.to_string()))?;

        if inner.rebuild_required(self) {
            inner.maintenance.request();
        }
        Ok(true)
    }

    /// Evicts least recently used entries until the budget is met.
    fn trim_to_size(&mut self, inner: &Inner) -> Result<usize> {
        let mut evicted = 0;
        while self.size > self.max_size {
            let Some(key) = self.entries.eviction_candidate() else {
                break;
            };
            debug!("Evicting {}", key);
            if self.remove_entry(inner, &key)? {
                self.stats.record_eviction();
                evicted += 1;
            }
        }
        Ok(evicted)
    }

    fn rebuild_journal(&mut self, inner: &Inner) -> Result<()> {
        self.flush_journal()?;
        let writer = journal::rebuild(
            &inner.journal_path,
            &inner.journal_tmp_path,
            &inner.header,
            &self.entries,
            &inner.pool,
            inner.buffer_size,
        )?;
        self.journal = Some(writer);
        self.redundant_op_count = 0;
        self.stats.record_rebuild();
        info!(
            "Rebuilt journal for {} with {} entries",
            inner.directory.display(),
            self.entries.len()
        );
        Ok(())
    }
}

// == Recovery ==
/// Replays the journal and settles interrupted edits.
fn recover(
    directory: &Path,
    journal_path: &Path,
    journal_tmp_path: &Path,
    header: &JournalHeader,
    pool: &Arc<BufferPool>,
    buffer_size: usize,
) -> Result<Recovered> {
    let mut entries = EntryTable::new();
    let outcome = journal::replay(journal_path, header, pool, buffer_size, &mut entries)?;
    let redundant_op_count = outcome.line_count.saturating_sub(entries.len());

    delete_if_exists(journal_tmp_path)?;

    // An edit that never reached CLEAN or REMOVE is discarded with its files.
    for entry in entries.take_interrupted() {
        debug!("Discarding interrupted edit of {}", entry.key);
        for index in 0..header.value_count {
            delete_if_exists(&entry.clean_file(directory, index))?;
            delete_if_exists(&entry.dirty_file(directory, index))?;
        }
    }
    let size = entries.iter_oldest_first().map(|entry| entry.total_length()).sum();

    let journal = if outcome.truncated {
        warn!(
            "Journal {} ends in a partial line, rebuilding",
            journal_path.display()
        );
        journal::rebuild(
            journal_path,
            journal_tmp_path,
            header,
            &entries,
            pool,
            buffer_size,
        )?
    } else {
        JournalWriter::open_append(journal_path, pool, buffer_size)?
    };

    Ok(Recovered {
        entries,
        size,
        journal,
        redundant_op_count,
    })
}

fn delete_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

fn delete_directory(directory: &Path) -> Result<()> {
    match fs::remove_dir_all(directory) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
