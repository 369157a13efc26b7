//! # History Store
//!
//! Append-only log of successful lookups. The whole sequence lives in memory and
//! is mirrored to a pretty-printed JSON file that is rewritten in full after every
//! append. Rewrites go through a temporary file in the same directory that is
//! renamed over the log, so a crash leaves either the old or the new file.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{info, warn};
use tempfile::NamedTempFile;

use crate::error::LookupError;
use crate::models::{HistoryEntry, LookupResult};

pub const DEFAULT_HISTORY_FILE: &str = "ip_history.json";

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Load the log at `path`; a missing file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LookupError> {
        let path = path.into();
        let entries = load_entries(&path)?;
        Ok(HistoryStore { path, entries })
    }

    /// Discard whatever is at `path` and start over with an empty, persisted log.
    pub fn reset(path: impl Into<PathBuf>) -> Result<Self, LookupError> {
        let store = HistoryStore {
            path: path.into(),
            entries: Vec::new(),
        };
        warn!("resetting history log {}", store.path.display());
        store.persist()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recorded lookups, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a successful lookup and rewrite the log.
    ///
    /// Returns `Ok(None)` without touching anything when `result` is not a success.
    /// If the rewrite fails the in-memory entry is dropped again.
    pub fn append(&mut self, result: &LookupResult) -> Result<Option<&HistoryEntry>, LookupError> {
        let Some(entry) = HistoryEntry::from_result(result, Local::now()) else {
            return Ok(None);
        };
        self.entries.push(entry);
        if let Err(e) = self.persist() {
            self.entries.pop();
            return Err(e);
        }
        info!(
            "recorded lookup of {} ({} entries)",
            self.entries.last().map(|e| e.ip.as_str()).unwrap_or_default(),
            self.entries.len()
        );
        Ok(self.entries.last())
    }

    fn persist(&self) -> Result<(), LookupError> {
        write_entries(&self.path, &self.entries).map_err(|source| LookupError::HistoryWrite {
            path: self.path.clone(),
            source,
        })
    }
}

fn load_entries(path: &Path) -> Result<Vec<HistoryEntry>, LookupError> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(LookupError::HistoryLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };
    serde_json::from_str(&contents).map_err(|e| LookupError::HistoryLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn write_entries(path: &Path, entries: &[HistoryEntry]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    // the temp file is removed on drop if anything below fails
    let tmp = NamedTempFile::new_in(&dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, entries)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
