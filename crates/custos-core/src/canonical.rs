//! The frozen canonical serialization and hashing rule.
//!
//! One function, used identically by the appender and the verifier. Any
//! change to field order, formatting, or the rendering of absent values
//! breaks verification of every historical record, so the rule is versioned
//! and the version octet is itself part of the hashed bytes.
//!
//! Canonical byte layout, version 1:
//!   1. version octet (0x01)
//!   2. event_type, length-prefixed
//!   3. actor_id, length-prefixed (absent renders as the zero-length string)
//!   4. subject_id, length-prefixed (same rule)
//!   5. timestamp as RFC 3339 UTC with fixed microsecond precision,
//!      length-prefixed
//!   6. metadata: u32 entry count, then per entry in ascending key order:
//!      length-prefixed key, one type-tag octet, length-prefixed rendering
//!   7. prev_hash, length-prefixed
//!
//! Every length prefix is a u32 in big-endian byte order. Length-prefixing
//! (rather than delimiter-joining) means no field value can smuggle a
//! separator: two distinct logical field sets always produce distinct bytes.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use sha2::{Digest, Sha256};

use custos_contracts::{AuditRecord, Metadata};

/// Version octet of the canonical encoding. Bump only with a migration plan:
/// a verifier built for one version always reports corruption against a log
/// written with another.
pub const CANONICAL_VERSION: u8 = 1;

/// Render a timestamp the one way the chain ever renders timestamps:
/// RFC 3339, UTC, exactly six fractional digits, trailing `Z`.
pub fn canonical_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Truncate a timestamp to the microsecond precision the canonical rendering
/// carries.
///
/// The appender truncates at assignment time so that a record's stored
/// timestamp and its canonical rendering never disagree below the rendered
/// precision.
pub fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    let micros = ts.timestamp_subsec_micros();
    ts.with_nanosecond(micros * 1_000)
        .expect("microsecond value multiplied by 1000 is always a valid nanosecond field")
}

/// Serialize the hashed fields of a record to canonical bytes.
pub fn canonical_bytes(
    event_type: &str,
    actor_id: Option<&str>,
    subject_id: Option<&str>,
    timestamp: &DateTime<Utc>,
    metadata: &Metadata,
    prev_hash: &str,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);
    buf.push(CANONICAL_VERSION);

    put_str(&mut buf, event_type);
    put_str(&mut buf, actor_id.unwrap_or(""));
    put_str(&mut buf, subject_id.unwrap_or(""));
    put_str(&mut buf, &canonical_timestamp(timestamp));

    buf.extend_from_slice(&(metadata.len() as u32).to_be_bytes());
    for (key, value) in metadata {
        put_str(&mut buf, key);
        buf.push(value.type_tag());
        put_str(&mut buf, &value.render());
    }

    put_str(&mut buf, prev_hash);
    buf
}

/// SHA-256 over the canonical bytes, as a lowercase 64-char hex string.
pub fn hash_fields(
    event_type: &str,
    actor_id: Option<&str>,
    subject_id: Option<&str>,
    timestamp: &DateTime<Utc>,
    metadata: &Metadata,
    prev_hash: &str,
) -> String {
    let bytes = canonical_bytes(event_type, actor_id, subject_id, timestamp, metadata, prev_hash);
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hex::encode(hasher.finalize())
}

/// Recompute the hash of a stored record from its own fields.
///
/// The verifier compares this against `record.hash` to detect in-place
/// content edits.
pub fn record_hash(record: &AuditRecord) -> String {
    hash_fields(
        &record.event_type,
        record.actor_id.as_deref(),
        record.subject_id.as_deref(),
        &record.timestamp,
        &record.metadata,
        &record.prev_hash,
    )
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use custos_contracts::{AuditEvent, MetadataValue, GENESIS_PREV_HASH};

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    }

    /// Identical inputs must always produce identical bytes and hashes.
    #[test]
    fn serialization_is_deterministic() {
        let meta: Metadata = [("ip".to_string(), MetadataValue::from("10.0.0.7"))]
            .into_iter()
            .collect();

        let a = hash_fields("USER_LOGIN", Some("u1"), None, &ts(), &meta, GENESIS_PREV_HASH);
        let b = hash_fields("USER_LOGIN", Some("u1"), None, &ts(), &meta, GENESIS_PREV_HASH);

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    /// Length-prefixing must prevent the classic delimiter-shift collision:
    /// moving bytes across a field boundary changes the encoding.
    #[test]
    fn field_boundaries_cannot_be_shifted() {
        let meta = Metadata::new();

        // Under naive '|'-joining both of these would serialize to
        // "LOGIN|AB|C|..." and collide.
        let a = canonical_bytes("LOGIN", Some("AB"), Some("C"), &ts(), &meta, "");
        let b = canonical_bytes("LOGIN", Some("A"), Some("BC"), &ts(), &meta, "");
        assert_ne!(a, b);
    }

    /// A metadata value containing what looks like a separator must not
    /// collide with two separate entries.
    #[test]
    fn metadata_values_cannot_forge_entries() {
        let joined: Metadata = [("k".to_string(), MetadataValue::from("v1|k2|v2"))]
            .into_iter()
            .collect();
        let split: Metadata = [
            ("k".to_string(), MetadataValue::from("v1")),
            ("k2".to_string(), MetadataValue::from("v2")),
        ]
        .into_iter()
        .collect();

        let a = canonical_bytes("X", None, None, &ts(), &joined, "");
        let b = canonical_bytes("X", None, None, &ts(), &split, "");
        assert_ne!(a, b);
    }

    /// Str("1") and Int(1) render identically but must hash differently.
    #[test]
    fn metadata_type_tags_disambiguate_renderings() {
        let as_str: Metadata = [("n".to_string(), MetadataValue::from("1"))]
            .into_iter()
            .collect();
        let as_int: Metadata = [("n".to_string(), MetadataValue::from(1i64))]
            .into_iter()
            .collect();

        assert_ne!(
            hash_fields("X", None, None, &ts(), &as_str, ""),
            hash_fields("X", None, None, &ts(), &as_int, ""),
        );
    }

    /// Absent actor/subject and prev_hash sentinel render as zero-length
    /// strings — present values change the hash.
    #[test]
    fn absent_fields_render_as_empty_token() {
        let meta = Metadata::new();
        let absent = hash_fields("X", None, None, &ts(), &meta, GENESIS_PREV_HASH);
        let present = hash_fields("X", Some("u1"), None, &ts(), &meta, GENESIS_PREV_HASH);
        assert_ne!(absent, present);
    }

    /// The timestamp rendering is fixed-precision UTC with a trailing Z.
    #[test]
    fn timestamp_renders_with_fixed_microsecond_precision() {
        let rendered = canonical_timestamp(&ts());
        assert_eq!(rendered, "2026-03-14T09:26:53.000000Z");

        let with_nanos = ts() + chrono::Duration::nanoseconds(123_456_789);
        let truncated = truncate_to_micros(with_nanos);
        assert_eq!(canonical_timestamp(&truncated), "2026-03-14T09:26:53.123456Z");
    }

    /// Sub-microsecond digits are dropped by truncation, so a stored
    /// timestamp always re-renders to the same canonical string.
    #[test]
    fn truncation_is_idempotent() {
        let with_nanos = ts() + chrono::Duration::nanoseconds(999);
        let once = truncate_to_micros(with_nanos);
        let twice = truncate_to_micros(once);
        assert_eq!(once, twice);
    }

    /// record_hash must recompute exactly what hash_fields produced when the
    /// record was built.
    #[test]
    fn record_hash_matches_append_time_hash() {
        let event = AuditEvent::new("RECORD_ACCESSED")
            .with_actor("u1")
            .with_subject("p1")
            .with_meta("ip", "10.0.0.7");

        let timestamp = ts();
        let hash = hash_fields(
            &event.event_type,
            event.actor_id.as_deref(),
            event.subject_id.as_deref(),
            &timestamp,
            &event.metadata,
            GENESIS_PREV_HASH,
        );

        let record = custos_contracts::AuditRecord {
            record_id: custos_contracts::RecordId::new(),
            sequence: 1,
            event_type: event.event_type.clone(),
            actor_id: event.actor_id.clone(),
            subject_id: event.subject_id.clone(),
            metadata: event.metadata.clone(),
            timestamp,
            prev_hash: GENESIS_PREV_HASH.to_string(),
            hash: hash.clone(),
        };

        assert_eq!(record_hash(&record), hash);
    }
}
