//! The storage contract of the audit trail.
//!
//! `AuditStore` is the seam between the chain core and whatever holds the
//! records. The contract is deliberately narrow: ordered, durable,
//! append-only, queryable. There is no update and no delete — a store that
//! exposes either to the core cannot carry the tamper-evidence guarantee.

use custos_contracts::{AuditQuery, AuditRecord, CustosResult};

/// An append-only, strictly ordered, durable collection of audit records.
///
/// Implementations must enforce the sequence discipline themselves: `append`
/// accepts a record only when its `sequence` is exactly one past the current
/// tail (or `FIRST_SEQUENCE` on an empty store) and fails with
/// `CustosError::ConcurrentAppend` otherwise. That conditional write is what
/// lets multiple writers race the tail safely — the losing writer's record
/// is rejected whole, and the appender retries its full read-compute-write
/// cycle with a fresh view of the tail.
pub trait AuditStore: Send + Sync {
    /// Append one record, conditional on `record.sequence` being the next
    /// sequence the store expects.
    ///
    /// On success the record is durable and visible to every subsequent
    /// scan. On `ConcurrentAppend` nothing was written.
    fn append(&self, record: AuditRecord) -> CustosResult<()>;

    /// The record with the highest sequence, or `None` on an empty store.
    fn tail(&self) -> CustosResult<Option<AuditRecord>>;

    /// Fetch a single record by sequence number.
    fn get(&self, sequence: u64) -> CustosResult<Option<AuditRecord>>;

    /// All records with `from_seq <= sequence <= to_seq`, ascending.
    /// `to_seq = None` scans to the tail.
    fn scan(&self, from_seq: u64, to_seq: Option<u64>) -> CustosResult<Vec<AuditRecord>>;

    /// Records matching the query's predicates, ascending, with the query's
    /// offset/limit applied after matching.
    fn query(&self, query: &AuditQuery) -> CustosResult<Vec<AuditRecord>>;

    /// Number of records held.
    fn len(&self) -> CustosResult<u64>;

    /// True when the store holds no records.
    fn is_empty(&self) -> CustosResult<bool> {
        Ok(self.len()? == 0)
    }
}
