//! Query and verify-request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::AuditRecord;

/// Predicate filter for trail queries over the audit store.
///
/// All fields are conjunctive; an empty query matches every record. Results
/// are always returned in ascending sequence order — the audit trail has one
/// authoritative order and queries do not get to change it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Exact event-type tag to match.
    pub event_type: Option<String>,

    /// Exact acting principal to match.
    pub actor_id: Option<String>,

    /// Exact subject record to match.
    pub subject_id: Option<String>,

    /// Inclusive lower timestamp bound.
    pub from_time: Option<DateTime<Utc>>,

    /// Inclusive upper timestamp bound.
    pub to_time: Option<DateTime<Utc>>,

    /// Skip this many matching records before returning any.
    pub offset: Option<u64>,

    /// Return at most this many records.
    pub limit: Option<u64>,
}

impl AuditQuery {
    /// True when `record` satisfies every set filter.
    ///
    /// `offset`/`limit` are pagination, not predicates — the store applies
    /// them after matching.
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(et) = &self.event_type {
            if &record.event_type != et {
                return false;
            }
        }
        if let Some(actor) = &self.actor_id {
            if record.actor_id.as_deref() != Some(actor.as_str()) {
                return false;
            }
        }
        if let Some(subject) = &self.subject_id {
            if record.subject_id.as_deref() != Some(subject.as_str()) {
                return false;
            }
        }
        if let Some(from) = &self.from_time {
            if record.timestamp < *from {
                return false;
            }
        }
        if let Some(to) = &self.to_time {
            if record.timestamp > *to {
                return false;
            }
        }
        true
    }
}

/// Parameters for an integrity verification run.
///
/// The default request verifies the entire log from the genesis sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// First sequence to verify. Defaults to the start of the store.
    pub from_seq: Option<u64>,

    /// Last sequence to verify (inclusive). Defaults to the tail.
    pub to_seq: Option<u64>,

    /// Trusted hash of the record immediately preceding `from_seq`, from a
    /// previous verification's `last_good_hash`. Lets a suffix of a large
    /// log be verified without replaying from the first record.
    pub anchor: Option<String>,

    /// When true, scanning continues past the first break and all later
    /// records are flagged suspect instead of stopping.
    pub full_report: bool,
}
