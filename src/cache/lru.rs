//! Entry Table Module
//!
//! Access-ordered map of entries. Iteration order is the LRU order, so the
//! table doubles as the eviction queue.

use lru::LruCache;

use crate::cache::entry::{EditorId, Entry};

// == Entry Table ==
/// Key to [`Entry`] map ordered by access.
///
/// Lookups through [`EntryTable::touch`] and [`EntryTable::get_or_create`]
/// move the entry to the most recently used position; `peek*` lookups don't.
#[derive(Debug)]
pub(crate) struct EntryTable {
    entries: LruCache<String, Entry>,
}

impl EntryTable {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            entries: LruCache::unbounded(),
        }
    }

    // == Touch ==
    /// Looks up an entry and marks it most recently used.
    pub fn touch(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.get_mut(key)
    }

    // == Get Or Create ==
    /// Returns the entry for `key`, inserting an empty one if absent.
    pub fn get_or_create(&mut self, key: &str, value_count: usize) -> &mut Entry {
        self.entries
            .get_or_insert_mut(key.to_string(), || Entry::new(key, value_count))
    }

    pub fn peek(&self, key: &str) -> Option<&Entry> {
        self.entries.peek(key)
    }

    pub fn peek_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.peek_mut(key)
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.entries.pop(key)
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Iteration ==
    /// Entries from least to most recently used.
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().rev().map(|(_, entry)| entry)
    }

    // == Eviction Candidate ==
    /// Least recently used entry that can be removed right now.
    ///
    /// Entries with an editor in flight are skipped.
    pub fn eviction_candidate(&self) -> Option<String> {
        self.iter_oldest_first()
            .find(|entry| entry.readable && !entry.is_being_edited())
            .map(|entry| entry.key.clone())
    }

    /// Keys and editors of every entry with an edit in flight.
    pub fn in_flight_edits(&self) -> Vec<(String, EditorId)> {
        self.iter_oldest_first()
            .filter_map(|entry| entry.current_editor.map(|id| (entry.key.clone(), id)))
            .collect()
    }

    /// Removes and returns every entry with an edit in flight.
    pub fn take_interrupted(&mut self) -> Vec<Entry> {
        let keys: Vec<String> = self
            .in_flight_edits()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        keys.iter().filter_map(|key| self.entries.pop(key.as_str())).collect()
    }
}
