//! In-memory reference implementation of `AuditStore`.
//!
//! A locked Vec with the conditional-append check. This is the store the
//! test suites lean on, and the semantic reference for durable
//! implementations: whatever a real backend does, its observable behavior
//! must match this one.

use std::sync::{Mutex, MutexGuard};

use custos_contracts::{
    AuditQuery, AuditRecord, CustosError, CustosResult, FIRST_SEQUENCE,
};
use custos_core::AuditStore;

/// An in-memory, append-only audit store.
///
/// # Thread safety
///
/// All operations acquire an internal `Mutex`; the conditional sequence
/// check and the push happen under one acquisition, so concurrent appenders
/// cannot both win the same sequence slot.
pub struct MemoryStore {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Create a store seeded with existing records, in the given order.
    ///
    /// For restoring snapshots and building verification fixtures. No chain
    /// validation happens here — deciding whether the records are intact is
    /// the verifier's job, not the store's.
    pub fn from_records(records: Vec<AuditRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Clone out all records in store order.
    pub fn snapshot(&self) -> CustosResult<Vec<AuditRecord>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> CustosResult<MutexGuard<'_, Vec<AuditRecord>>> {
        self.records.lock().map_err(|e| CustosError::StoreUnavailable {
            reason: format!("memory store lock poisoned: {}", e),
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditStore for MemoryStore {
    fn append(&self, record: AuditRecord) -> CustosResult<()> {
        let mut records = self.lock()?;
        let expected = records
            .last()
            .map(|r| r.sequence + 1)
            .unwrap_or(FIRST_SEQUENCE);
        if record.sequence != expected {
            return Err(CustosError::ConcurrentAppend {
                expected,
                found: record.sequence,
            });
        }
        records.push(record);
        Ok(())
    }

    fn tail(&self) -> CustosResult<Option<AuditRecord>> {
        Ok(self.lock()?.last().cloned())
    }

    fn get(&self, sequence: u64) -> CustosResult<Option<AuditRecord>> {
        Ok(self.lock()?.iter().find(|r| r.sequence == sequence).cloned())
    }

    fn scan(&self, from_seq: u64, to_seq: Option<u64>) -> CustosResult<Vec<AuditRecord>> {
        Ok(self
            .lock()?
            .iter()
            .filter(|r| r.sequence >= from_seq && to_seq.map_or(true, |t| r.sequence <= t))
            .cloned()
            .collect())
    }

    fn query(&self, query: &AuditQuery) -> CustosResult<Vec<AuditRecord>> {
        let records = self.lock()?;
        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(records
            .iter()
            .filter(|r| query.matches(r))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn len(&self) -> CustosResult<u64> {
        Ok(self.lock()?.len() as u64)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
