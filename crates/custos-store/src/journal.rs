//! Durable append-only JSONL journal.
//!
//! One serde_json record per line, fsynced on every append. On open the
//! whole journal is replayed into memory to recover the tail; reads are
//! served from that cache while the file only ever grows. No rewrite path
//! exists — there is nothing in this module that can change a line once
//! written, which is exactly the property the chain needs from its store.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::info;

use custos_contracts::{
    AuditQuery, AuditRecord, CustosError, CustosResult, FIRST_SEQUENCE,
};
use custos_core::AuditStore;

#[derive(Debug)]
struct JournalState {
    file: File,
    records: Vec<AuditRecord>,
}

/// A file-backed audit store: append-only JSON Lines.
#[derive(Debug)]
pub struct JournalStore {
    path: PathBuf,
    state: Mutex<JournalState>,
}

impl JournalStore {
    /// Open the journal at `path`, creating it if absent, and replay its
    /// contents to recover the current tail.
    ///
    /// Fails with `StoreUnavailable` if the file cannot be opened or any
    /// line does not parse as a record — a journal that cannot be replayed
    /// in full must not accept further appends.
    pub fn open(path: impl AsRef<Path>) -> CustosResult<Self> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)
            .map_err(|e| unavailable(&path, "open journal", &e))?;

        let records = Self::replay(&path)?;
        info!(
            path = %path.display(),
            records = records.len(),
            "audit journal opened"
        );

        Ok(Self {
            path,
            state: Mutex::new(JournalState { file, records }),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replay(path: &Path) -> CustosResult<Vec<AuditRecord>> {
        let file = File::open(path).map_err(|e| unavailable(path, "read journal", &e))?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| unavailable(path, "read journal line", &e))?;
            if line.trim().is_empty() {
                continue;
            }
            let record: AuditRecord =
                serde_json::from_str(&line).map_err(|e| CustosError::StoreUnavailable {
                    reason: format!(
                        "journal '{}' line {} does not parse as an audit record: {}",
                        path.display(),
                        idx + 1,
                        e
                    ),
                })?;
            records.push(record);
        }
        Ok(records)
    }

    fn lock(&self) -> CustosResult<MutexGuard<'_, JournalState>> {
        self.state.lock().map_err(|e| CustosError::StoreUnavailable {
            reason: format!("journal lock poisoned: {}", e),
        })
    }
}

impl AuditStore for JournalStore {
    fn append(&self, record: AuditRecord) -> CustosResult<()> {
        let mut state = self.lock()?;

        let expected = state
            .records
            .last()
            .map(|r| r.sequence + 1)
            .unwrap_or(FIRST_SEQUENCE);
        if record.sequence != expected {
            return Err(CustosError::ConcurrentAppend {
                expected,
                found: record.sequence,
            });
        }

        let line = serde_json::to_string(&record).map_err(|e| CustosError::StoreUnavailable {
            reason: format!("failed to serialize audit record: {}", e),
        })?;

        writeln!(state.file, "{}", line)
            .map_err(|e| unavailable(&self.path, "append to journal", &e))?;
        state
            .file
            .flush()
            .map_err(|e| unavailable(&self.path, "flush journal", &e))?;
        state
            .file
            .sync_data()
            .map_err(|e| unavailable(&self.path, "sync journal", &e))?;

        state.records.push(record);
        Ok(())
    }

    fn tail(&self) -> CustosResult<Option<AuditRecord>> {
        Ok(self.lock()?.records.last().cloned())
    }

    fn get(&self, sequence: u64) -> CustosResult<Option<AuditRecord>> {
        Ok(self
            .lock()?
            .records
            .iter()
            .find(|r| r.sequence == sequence)
            .cloned())
    }

    fn scan(&self, from_seq: u64, to_seq: Option<u64>) -> CustosResult<Vec<AuditRecord>> {
        Ok(self
            .lock()?
            .records
            .iter()
            .filter(|r| r.sequence >= from_seq && to_seq.map_or(true, |t| r.sequence <= t))
            .cloned()
            .collect())
    }

    fn query(&self, query: &AuditQuery) -> CustosResult<Vec<AuditRecord>> {
        let state = self.lock()?;
        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(state
            .records
            .iter()
            .filter(|r| query.matches(r))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn len(&self) -> CustosResult<u64> {
        Ok(self.lock()?.records.len() as u64)
    }
}

fn unavailable(path: &Path, action: &str, err: &std::io::Error) -> CustosError {
    CustosError::StoreUnavailable {
        reason: format!("{} '{}': {}", action, path.display(), err),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
