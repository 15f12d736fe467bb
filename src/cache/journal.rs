//! Journal Module
//!
//! Append-only text log of entry state transitions.
//!
//! ```text
//! libcore.io.DiskLruCache
//! 1
//! 100
//! 2
//!
//! CLEAN 3400330d1dfc7f3f7f4b8d4d803dfcf6 832 21054
//! DIRTY 335c4c6028171cfddfbaae1a9c313c52
//! CLEAN 335c4c6028171cfddfbaae1a9c313c52 3934 2342
//! REMOVE 335c4c6028171cfddfbaae1a9c313c52
//! DIRTY 1ab96a171faeeee38496d8b330771a7a
//! CLEAN 1ab96a171faeeee38496d8b330771a7a 1600 234
//! READ 335c4c6028171cfddfbaae1a9c313c52
//! READ 3400330d1dfc7f3f7f4b8d4d803dfcf6
//! ```
//!
//! The header holds the magic string, the format version, the owner's app
//! version, the value count and a blank line. Each body line is one record.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crate::bufio::{BufferPool, PooledBufReader, PooledBufWriter};
use crate::cache::entry::{Entry, RECOVERED_EDITOR};
use crate::cache::lines::LineReader;
use crate::cache::lru::EntryTable;
use crate::cache::{MAGIC, VERSION};
use crate::error::{CacheError, Result};

const CLEAN: &str = "CLEAN";
const DIRTY: &str = "DIRTY";
const REMOVE: &str = "REMOVE";
const READ: &str = "READ";

// == Header ==
/// Parameters an existing journal must match to be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct JournalHeader {
    pub app_version: u32,
    pub value_count: usize,
}

impl JournalHeader {
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        write!(
            writer,
            "{}\n{}\n{}\n{}\n\n",
            MAGIC, VERSION, self.app_version, self.value_count
        )
    }

    /// Reads the five header lines and checks each one exactly.
    fn validate<R: io::BufRead>(&self, lines: &mut LineReader<R>) -> Result<()> {
        let magic = lines.expect_line("magic")?;
        let version = lines.expect_line("version")?;
        let app_version = lines.expect_line("app version")?;
        let value_count = lines.expect_line("value count")?;
        let blank = lines.expect_line("header terminator")?;

        if magic != MAGIC
            || version != VERSION
            || app_version != self.app_version.to_string()
            || value_count != self.value_count.to_string()
            || !blank.is_empty()
        {
            return Err(CacheError::corrupt(format!(
                "unexpected journal header: [{}, {}, {}, {}, {}]",
                magic, version, value_count, app_version, blank
            )));
        }
        Ok(())
    }
}

// == Journal Record ==
/// One body line of the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum JournalRecord {
    /// An edit started
    Dirty(String),
    /// An edit committed with these value lengths
    Clean(String, Vec<u64>),
    /// The entry was deleted
    Remove(String),
    /// The entry was read
    Read(String),
}

impl JournalRecord {
    pub fn clean(entry: &Entry) -> Self {
        JournalRecord::Clean(entry.key.clone(), entry.lengths.clone())
    }

    /// Parses one body line. Anything unexpected is corruption.
    pub fn parse(line: &str, value_count: usize) -> Result<Self> {
        let mut fields = line.split(' ');
        let op = fields.next().unwrap_or_default();
        let key = match fields.next() {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Err(CacheError::corrupt(format!("unexpected journal line: {}", line))),
        };
        let rest: Vec<&str> = fields.collect();

        match (op, rest.is_empty()) {
            (CLEAN, _) => {
                if rest.len() != value_count {
                    return Err(CacheError::corrupt(format!(
                        "unexpected journal line: {}",
                        line
                    )));
                }
                let lengths = rest
                    .iter()
                    .map(|field| field.parse::<u64>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|_| {
                        CacheError::corrupt(format!("unexpected journal line: {}", line))
                    })?;
                Ok(JournalRecord::Clean(key, lengths))
            }
            (DIRTY, true) => Ok(JournalRecord::Dirty(key)),
            (REMOVE, true) => Ok(JournalRecord::Remove(key)),
            (READ, true) => Ok(JournalRecord::Read(key)),
            _ => Err(CacheError::corrupt(format!(
                "unexpected journal line: {}",
                line
            ))),
        }
    }

    /// Applies the record to the table during replay.
    fn apply(self, entries: &mut EntryTable, value_count: usize) {
        match self {
            JournalRecord::Remove(key) => {
                entries.remove(&key);
            }
            JournalRecord::Clean(key, lengths) => {
                let entry = entries.get_or_create(&key, value_count);
                entry.readable = true;
                entry.current_editor = None;
                entry.lengths = lengths;
            }
            JournalRecord::Dirty(key) => {
                entries.get_or_create(&key, value_count).current_editor = Some(RECOVERED_EDITOR);
            }
            JournalRecord::Read(key) => {
                // Recency only.
                entries.touch(&key);
            }
        }
    }
}

impl fmt::Display for JournalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalRecord::Dirty(key) => write!(f, "{} {}", DIRTY, key),
            JournalRecord::Remove(key) => write!(f, "{} {}", REMOVE, key),
            JournalRecord::Read(key) => write!(f, "{} {}", READ, key),
            JournalRecord::Clean(key, lengths) => {
                write!(f, "{} {}", CLEAN, key)?;
                for length in lengths {
                    write!(f, " {}", length)?;
                }
                Ok(())
            }
        }
    }
}

// == Replay ==
/// What replaying an existing journal produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReplayOutcome {
    /// Body lines applied
    pub line_count: usize,
    /// The file ended in a partial line
    pub truncated: bool,
}

/// Replays `path` into `entries`.
pub(crate) fn replay(
    path: &Path,
    header: &JournalHeader,
    pool: &Arc<BufferPool>,
    buffer_size: usize,
    entries: &mut EntryTable,
) -> Result<ReplayOutcome> {
    let file = File::open(path)?;
    let mut lines = LineReader::new(PooledBufReader::with_capacity(
        buffer_size,
        file,
        Arc::clone(pool),
    ));
    header.validate(&mut lines)?;

    let mut line_count = 0;
    while let Some(line) = lines.next_line()? {
        JournalRecord::parse(&line, header.value_count)?.apply(entries, header.value_count);
        line_count += 1;
    }

    Ok(ReplayOutcome {
        line_count,
        truncated: lines.has_unterminated_line(),
    })
}

// == Journal Writer ==
/// Appending writer over the active journal.
pub(crate) struct JournalWriter {
    writer: PooledBufWriter<File>,
}

impl JournalWriter {
    /// Opens an existing journal for appending.
    pub fn open_append(path: &Path, pool: &Arc<BufferPool>, buffer_size: usize) -> Result<Self> {
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(Self {
            writer: PooledBufWriter::with_capacity(buffer_size, file, Arc::clone(pool)),
        })
    }

    pub fn append(&mut self, record: &JournalRecord) -> Result<()> {
        writeln!(self.writer, "{}", record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// == Rebuild ==
/// Writes a compact journal for `entries` and swaps it in.
///
/// The new journal is written to `tmp_path`, synced, then renamed over
/// `path`. Entries are written least recently used first so a replay
/// restores the same order.
pub(crate) fn rebuild(
    path: &Path,
    tmp_path: &Path,
    header: &JournalHeader,
    entries: &EntryTable,
    pool: &Arc<BufferPool>,
    buffer_size: usize,
) -> Result<JournalWriter> {
    {
        let file = File::create(tmp_path)?;
        let mut writer = PooledBufWriter::with_capacity(buffer_size, file, Arc::clone(pool));
        header.write_to(&mut writer)?;
        for entry in entries.iter_oldest_first() {
            let record = if entry.is_being_edited() {
                JournalRecord::Dirty(entry.key.clone())
            } else {
                JournalRecord::clean(entry)
            };
            writeln!(writer, "{}", record)?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(tmp_path, path)?;
    JournalWriter::open_append(path, pool, buffer_size)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: JournalHeader = JournalHeader {
        app_version: 100,
        value_count: 2,
    };

    fn pool() -> Arc<BufferPool> {
        Arc::new(BufferPool::new(64 * 1024))
    }

    fn write_journal(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("journal");
        let mut contents = Vec::new();
        HEADER.write_to(&mut contents).unwrap();
        contents.extend_from_slice(body.as_bytes());
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_header_format() {
        let mut out = Vec::new();
        HEADER.write_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "libcore.io.DiskLruCache\n1\n100\n2\n\n"
        );
    }

    #[test]
    fn test_record_display() {
        assert_eq!(JournalRecord::Dirty("k".into()).to_string(), "DIRTY k");
        assert_eq!(JournalRecord::Remove("k".into()).to_string(), "REMOVE k");
        assert_eq!(JournalRecord::Read("k".into()).to_string(), "READ k");
        assert_eq!(
            JournalRecord::Clean("k".into(), vec![3, 4]).to_string(),
            "CLEAN k 3 4"
        );
    }

    #[test]
    fn test_record_parse() {
        assert_eq!(
            JournalRecord::parse("CLEAN k 3 4", 2).unwrap(),
            JournalRecord::Clean("k".into(), vec![3, 4])
        );
        assert_eq!(
            JournalRecord::parse("DIRTY k", 2).unwrap(),
            JournalRecord::Dirty("k".into())
        );
        assert_eq!(
            JournalRecord::parse("REMOVE k", 2).unwrap(),
            JournalRecord::Remove("k".into())
        );
        assert_eq!(
            JournalRecord::parse("READ k", 2).unwrap(),
            JournalRecord::Read("k".into())
        );
    }

    #[test]
    fn test_record_parse_rejects_malformed() {
        for line in [
            "",
            "CLEAN",
            "CLEAN k",
            "CLEAN k 1",
            "CLEAN k 1 2 3",
            "CLEAN k 1 x",
            "CLEAN k -1 2",
            "DIRTY k extra",
            "REMOVE",
            "BOGUS k",
            "DIRTY  k",
        ] {
            assert!(
                matches!(JournalRecord::parse(line, 2), Err(CacheError::Corrupt(_))),
                "line {:?} should be corrupt",
                line
            );
        }
    }

    #[test]
    fn test_replay_builds_table() {
        let dir = TempDir::new().unwrap();
        let path = write_journal(
            &dir,
            "DIRTY a\nCLEAN a 1 2\nDIRTY b\nCLEAN b 3 4\nDIRTY c\nREMOVE b\nREAD a\nREMOVE zzz\n",
        );

        let mut entries = EntryTable::new();
        let outcome = replay(&path, &HEADER, &pool(), 64, &mut entries).unwrap();
        assert_eq!(outcome.line_count, 8);
        assert!(!outcome.truncated);
        assert_eq!(entries.len(), 2);

        let a = entries.peek("a").unwrap();
        assert!(a.readable);
        assert_eq!(a.lengths, vec![1, 2]);
        assert_eq!(a.current_editor, None);

        let c = entries.peek("c").unwrap();
        assert!(!c.readable);
        assert_eq!(c.current_editor, Some(RECOVERED_EDITOR));

        // READ a moved it behind c
        let order: Vec<&str> = entries.iter_oldest_first().map(|e| e.key.as_str()).collect();
        assert_eq!(order, vec!["c", "a"]);
    }

    #[test]
    fn test_replay_rejects_header_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = write_journal(&dir, "CLEAN a 1 2\n");

        let other = JournalHeader {
            app_version: 101,
            value_count: 2,
        };
        let mut entries = EntryTable::new();
        let result = replay(&path, &other, &pool(), 64, &mut entries);
        assert!(matches!(result, Err(CacheError::Corrupt(_))));
    }

    #[test]
    fn test_replay_reports_truncated_tail() {
        let dir = TempDir::new().unwrap();
        let path = write_journal(&dir, "CLEAN a 1 2\nCLEAN b 3");

        let mut entries = EntryTable::new();
        let outcome = replay(&path, &HEADER, &pool(), 64, &mut entries).unwrap();
        assert_eq!(outcome.line_count, 1);
        assert!(outcome.truncated);
        assert!(entries.peek("b").is_none());
    }

    #[test]
    fn test_rebuild_then_replay_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal");
        let tmp = dir.path().join("journal.tmp");

        let mut entries = EntryTable::new();
        {
            let a = entries.get_or_create("a", 2);
            a.readable = true;
            a.lengths = vec![1, 2];
        }
        entries.get_or_create("b", 2).current_editor = Some(9);

        let mut writer = rebuild(&path, &tmp, &HEADER, &entries, &pool(), 64).unwrap();
        writer.append(&JournalRecord::Read("a".into())).unwrap();
        writer.flush().unwrap();
        assert!(!tmp.exists());

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "libcore.io.DiskLruCache\n1\n100\n2\n\nCLEAN a 1 2\nDIRTY b\nREAD a\n"
        );

        let mut replayed = EntryTable::new();
        let outcome = replay(&path, &HEADER, &pool(), 64, &mut replayed).unwrap();
        assert_eq!(outcome.line_count, 3);
        assert_eq!(replayed.peek("a").unwrap().lengths, vec![1, 2]);
        assert!(replayed.peek("b").unwrap().is_being_edited());
    }
}
