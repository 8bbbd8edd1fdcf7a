//! Calculation history: newest-first store, JSON persistence, text export.
//!
//! Entries are stored newest-first (the order the file keeps them in) but
//! users count them oldest-first, so every 1-based ordinal coming from a
//! voice command is resolved through [`History::item`].

use std::fmt::{self, Write as _};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone, Utc};
use voxcalc_types::{HistoryEntry, HistoryRecord, HistorySelection};
use voxcalc_utils::{atomic_write, recover_bak_file};

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history io at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("history file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    path: Option<PathBuf>,
}

impl History {
    /// A history that is never written to disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from `path`. A missing file is an empty history bound to `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        recover_bak_file(&path);

        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Vec::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| HistoryError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(HistoryError::Io { path, source }),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "history loaded");
        Ok(Self {
            entries,
            path: Some(path),
        })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn append(&mut self, record: HistoryRecord) -> &HistoryEntry {
        self.append_at(record, Utc::now().timestamp_millis())
    }

    pub fn append_at(&mut self, record: HistoryRecord, timestamp: i64) -> &HistoryEntry {
        self.entries
            .insert(0, HistoryEntry::from_record(record, timestamp));
        &self.entries[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries_newest_first(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Oldest first, the order entries are numbered in.
    pub fn presentation(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }

    /// The entry at 1-based presentation ordinal `n`.
    #[must_use]
    pub fn item(&self, n: usize) -> Option<&HistoryEntry> {
        if n == 0 || n > self.entries.len() {
            return None;
        }
        self.entries.get(self.entries.len() - n)
    }

    /// The `n` most recent entries, oldest first.
    #[must_use]
    pub fn last(&self, n: usize) -> Vec<&HistoryEntry> {
        let take = n.min(self.entries.len());
        self.entries[..take].iter().rev().collect()
    }

    /// Resolve a selection. An out-of-range item falls back to everything.
    #[must_use]
    pub fn select(&self, selection: HistorySelection) -> Vec<&HistoryEntry> {
        match selection {
            HistorySelection::All => self.presentation().collect(),
            HistorySelection::Last(n) => self.last(n),
            HistorySelection::Item(n) => match self.item(n) {
                Some(entry) => vec![entry],
                None => self.presentation().collect(),
            },
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Persist to the bound path. In-memory histories are a no-op.
    pub fn save(&self) -> Result<(), HistoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(&self.entries).map_err(|source| {
            HistoryError::Json {
                path: path.clone(),
                source,
            }
        })?;
        atomic_write(path, &json).map_err(|source| HistoryError::Io {
            path: path.clone(),
            source,
        })
    }

    /// Write the selected entries to a timestamped text file in `dir`.
    pub fn export(
        &self,
        selection: HistorySelection,
        dir: &Path,
    ) -> Result<(PathBuf, usize), HistoryError> {
        let now = Local::now();
        let entries = self.select(selection);
        let text = render_export(&entries, now);
        let path = dir.join(format!(
            "calculator_history_{}.txt",
            now.format("%Y%m%d_%H%M%S")
        ));
        atomic_write(&path, text.as_bytes()).map_err(|source| HistoryError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), entries = entries.len(), "history exported");
        Ok((path, entries.len()))
    }
}

/// Plain-text export body, entries numbered from 1.
#[must_use]
pub fn render_export<Tz: TimeZone>(entries: &[&HistoryEntry], generated: DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    let mut out = String::from("Calculator History\n");
    let _ = writeln!(out, "Generated on: {}", generated.format("%Y-%m-%d %H:%M:%S"));
    out.push('\n');
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(out, "{}. {} = {}", i + 1, entry.expression, entry.result);
    }
    out
}
