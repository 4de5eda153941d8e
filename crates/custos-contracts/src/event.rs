//! Audit event input types and the event-type vocabulary.
//!
//! An `AuditEvent` is what an event source hands to the chain appender: the
//! what (`event_type`), the who (`actor_id`), the about-whom (`subject_id`),
//! and free-form context (`metadata`). It is transient — the appender turns
//! it into an `AuditRecord` by assigning the timestamp, sequence number, and
//! hashes. Events never carry their own timestamp; clocks belong to the
//! chain, not to callers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CustosError, CustosResult};

/// Curated event-type tags recorded by the surrounding record-keeping system.
///
/// The vocabulary is open — any tag matching the well-formedness rule is
/// accepted — but these constants cover the flows the system actually emits,
/// so filtering and summarization stay meaningful.
pub mod event_types {
    pub const PATIENT_ENROLLED: &str = "PATIENT_ENROLLED";
    pub const PATIENT_ACCESSED: &str = "PATIENT_ACCESSED";
    pub const PATIENT_UPDATED: &str = "PATIENT_UPDATED";
    pub const RECORD_ACCESSED: &str = "RECORD_ACCESSED";
    pub const ENCOUNTER_CREATED: &str = "ENCOUNTER_CREATED";
    pub const CONSENT_UPDATED: &str = "CONSENT_UPDATED";
    pub const FILE_UPLOADED: &str = "FILE_UPLOADED";
    pub const EMERGENCY_ACCESS: &str = "EMERGENCY_ACCESS";
    pub const USER_LOGIN: &str = "USER_LOGIN";
    pub const USER_LOGOUT: &str = "USER_LOGOUT";
    pub const USER_REGISTERED: &str = "USER_REGISTERED";
    pub const PASSWORD_CHANGED: &str = "PASSWORD_CHANGED";
    pub const TOKEN_REFRESHED: &str = "TOKEN_REFRESHED";
}

/// A scalar metadata value.
///
/// Metadata is deliberately restricted to scalars: nested structures would
/// need their own canonical ordering rules, and nothing the surrounding
/// system records requires them. Each variant has exactly one rendering in
/// the canonical byte serialization, so two logically equal values always
/// hash identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl MetadataValue {
    /// Render the value for canonical serialization.
    ///
    /// Integers render in decimal, booleans as `true`/`false`, floats with
    /// Rust's shortest-roundtrip formatting. The canonical encoder prefixes
    /// each rendering with a type tag, so `Str("1")` and `Int(1)` can never
    /// collide.
    pub fn render(&self) -> String {
        match self {
            MetadataValue::Bool(b) => b.to_string(),
            MetadataValue::Int(i) => i.to_string(),
            MetadataValue::Float(f) => f.to_string(),
            MetadataValue::Str(s) => s.clone(),
        }
    }

    /// The single-octet type tag used by the canonical encoder.
    pub fn type_tag(&self) -> u8 {
        match self {
            MetadataValue::Bool(_) => b'b',
            MetadataValue::Int(_) => b'i',
            MetadataValue::Float(_) => b'f',
            MetadataValue::Str(_) => b's',
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Str(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Str(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        MetadataValue::Int(i)
    }
}

impl From<u64> for MetadataValue {
    fn from(u: u64) -> Self {
        // Sizes and counts arrive as u64; values beyond i64::MAX do not
        // occur in practice but must still round-trip deterministically.
        match i64::try_from(u) {
            Ok(i) => MetadataValue::Int(i),
            Err(_) => MetadataValue::Str(u.to_string()),
        }
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Ordered string-keyed metadata.
///
/// A `BTreeMap` keeps keys in lexicographic order by construction, which is
/// what makes metadata serialization deterministic without a sort step.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A security-relevant event, as submitted by an event source.
///
/// `actor_id` and `subject_id` are legitimately optional: system-triggered
/// events have no actor, account-level events have no subject. Empty strings
/// are normalized to absent at construction so the two spellings cannot
/// produce distinct hashes for the same logical event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Tag from the event-type vocabulary, e.g. `PATIENT_ENROLLED`.
    pub event_type: String,

    /// The principal performing the action, if any.
    pub actor_id: Option<String>,

    /// The record the event concerns (e.g. a patient identifier), if any.
    pub subject_id: Option<String>,

    /// Free-form scalar context (IP address, changed field names, …).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

impl AuditEvent {
    /// Create an event with the given type tag and no actor, subject, or
    /// metadata.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            actor_id: None,
            subject_id: None,
            metadata: Metadata::new(),
        }
    }

    /// Set the acting principal. An empty string is treated as absent.
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = normalize(actor_id.into());
        self
    }

    /// Set the subject record. An empty string is treated as absent.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = normalize(subject_id.into());
        self
    }

    /// Add one metadata entry. Inserting an existing key replaces its value.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check the event is acceptable for appending.
    ///
    /// The only rejectable input is the type tag: an empty or ill-formed tag
    /// would make later filtering and summarization meaningless. Tags must
    /// match `[A-Z][A-Z0-9_]*`.
    pub fn validate(&self) -> CustosResult<()> {
        if self.event_type.is_empty() {
            return Err(CustosError::InvalidEvent {
                reason: "event_type must not be empty".to_string(),
            });
        }

        let mut chars = self.event_type.chars();
        let first = chars.next().expect("non-empty checked above");
        let well_formed = first.is_ascii_uppercase()
            && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');

        if !well_formed {
            return Err(CustosError::InvalidEvent {
                reason: format!(
                    "event_type '{}' is not an uppercase tag ([A-Z][A-Z0-9_]*)",
                    self.event_type
                ),
            });
        }

        Ok(())
    }
}

fn normalize(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
