//! The persisted audit record and its chain fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Metadata;

/// The `prev_hash` sentinel for the first record of a chain.
///
/// Real hashes are always 64 lowercase hex characters, so the empty string
/// can never collide with one — genesis detection is unambiguous.
pub const GENESIS_PREV_HASH: &str = "";

/// The sequence number assigned to the first record of a chain.
pub const FIRST_SEQUENCE: u64 = 1;

/// Opaque convenience identifier for a single audit record.
///
/// The definitive ordering key is `AuditRecord::sequence`; the id exists so
/// operators and external tooling can reference a record without leaking
/// positional information.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One immutable entry in the audit chain.
///
/// Created exactly once by the chain appender, read many times, never
/// updated. Every field except `record_id` and `hash` participates in the
/// hash; modifying any of them — or reordering records — is detectable by
/// replaying the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Convenience identifier, assigned at append time.
    pub record_id: RecordId,

    /// Strictly increasing, gapless position in the chain, starting at
    /// `FIRST_SEQUENCE`. The definitive ordering key — timestamps alone are
    /// not a reliable order under clock skew.
    pub sequence: u64,

    /// Tag from the event-type vocabulary.
    pub event_type: String,

    /// The principal performing the action, if any.
    pub actor_id: Option<String>,

    /// The record the event concerns, if any.
    pub subject_id: Option<String>,

    /// Scalar context carried over from the event.
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub metadata: Metadata,

    /// Append instant (UTC), truncated to microsecond precision and
    /// monotonically non-decreasing along the chain.
    pub timestamp: DateTime<Utc>,

    /// The `hash` of the immediately preceding record, or
    /// `GENESIS_PREV_HASH` for the first record.
    pub prev_hash: String,

    /// Lowercase hex SHA-256 over the canonical serialization of
    /// {event_type, actor_id, subject_id, timestamp, metadata, prev_hash}.
    pub hash: String,
}

impl AuditRecord {
    /// True when this is the first record of its chain.
    pub fn is_genesis(&self) -> bool {
        self.sequence == FIRST_SEQUENCE
    }
}
