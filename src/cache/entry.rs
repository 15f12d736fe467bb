//! Cache Entry Module
//!
//! Per-key metadata and the file names of its value slots.

use std::path::{Path, PathBuf};

use crate::error::{CacheError, Result};

/// Identity of the editor currently holding an entry.
pub(crate) type EditorId = u64;

/// Marker used while replaying a `DIRTY` line whose editor no longer exists.
pub(crate) const RECOVERED_EDITOR: EditorId = 0;

// == Cache Entry ==
/// Metadata for one cached key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    pub key: String,
    /// Length of each committed value file
    pub lengths: Vec<u64>,
    /// True once the entry has been committed at least once
    pub readable: bool,
    /// Editor holding the single-writer lock, if any
    pub current_editor: Option<EditorId>,
    /// Assigned on every successful commit
    pub sequence_number: u64,
}

impl Entry {
    // == Constructor ==
    pub fn new(key: &str, value_count: usize) -> Self {
        Self {
            key: key.to_string(),
            lengths: vec![0; value_count],
            readable: false,
            current_editor: None,
            sequence_number: 0,
        }
    }

    pub fn is_being_edited(&self) -> bool {
        self.current_editor.is_some()
    }

    /// Sum of all committed value lengths.
    pub fn total_length(&self) -> u64 {
        self.lengths.iter().sum()
    }

    // == File Names ==
    /// `<dir>/<key>.<index>`
    pub fn clean_file(&self, directory: &Path, index: usize) -> PathBuf {
        directory.join(format!("{}.{}", self.key, index))
    }

    /// `<dir>/<key>.<index>.tmp`
    pub fn dirty_file(&self, directory: &Path, index: usize) -> PathBuf {
        directory.join(format!("{}.{}.tmp", self.key, index))
    }
}

// == Key Validation ==
/// Rejects keys that cannot be written as one journal field and one file name.
pub fn validate_key(key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        "key must not be empty"
    } else if key.contains(' ') {
        "key must not contain spaces"
    } else if key.contains('\n') || key.contains('\r') {
        "key must not contain line breaks"
    } else if key.contains('/') || key.contains('\\') {
        "key must not contain path separators"
    } else if key.contains('\0') {
        "key must not contain NUL"
    } else {
        return Ok(());
    };

    Err(CacheError::InvalidKey {
        key: key.to_string(),
        reason,
    })
}
