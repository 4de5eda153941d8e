//! Verification and summary report types.
//!
//! Reports are pure data: a verification run embeds no wall-clock time, so
//! running it twice over an unmodified store yields byte-identical output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// Which of the three per-record checks failed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakReason {
    /// The record's stored hash does not match the hash recomputed from its
    /// fields — the record's content was edited in place.
    ContentMismatch,

    /// The record's `prev_hash` does not match the hash of its predecessor —
    /// a record was reordered, inserted, or replaced relative to its
    /// neighbors.
    ChainMismatch,

    /// The record's sequence number is not the expected next integer — a
    /// record was deleted from the run.
    SequenceGap,
}

impl std::fmt::Display for BreakReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BreakReason::ContentMismatch => "content-mismatch",
            BreakReason::ChainMismatch => "chain-mismatch",
            BreakReason::SequenceGap => "sequence-gap",
        };
        f.write_str(s)
    }
}

/// The first point of divergence found by a verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBreak {
    /// Sequence number of the offending record as stored.
    pub sequence: u64,
    /// Which check failed.
    pub reason: BreakReason,
}

/// The outcome of replaying a range of the audit chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True when every record in the scanned range passed all three checks.
    pub valid: bool,

    /// Number of records scanned, including an offending one.
    pub checked_count: u64,

    /// First sequence actually scanned, absent when the store was empty.
    pub from_seq: Option<u64>,

    /// Last sequence actually scanned — reflects what the run observed, not
    /// what was requested (a verify racing an in-flight append simply may
    /// not see the newest record).
    pub to_seq: Option<u64>,

    /// The earliest divergence, if any.
    pub broken_at: Option<ChainBreak>,

    /// The last record that passed all checks before the break, or the final
    /// record of a fully valid range.
    pub last_good_seq: Option<u64>,

    /// Hash of the last good record. On a fully valid run this is a fresh
    /// anchor: a later verification can start from `to_seq + 1` seeded with
    /// this value instead of replaying from the first record.
    pub last_good_hash: Option<String>,

    /// Sequences after the break, flagged but not classified — once the
    /// chain is broken, arbitrary content could have been substituted, so
    /// per-record verdicts past the break carry no evidentiary weight.
    /// Populated only when the caller asked for a full report.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suspect: Vec<u64>,
}

impl VerificationReport {
    /// A report for an empty scan range — trivially valid.
    pub fn empty() -> Self {
        Self {
            valid: true,
            checked_count: 0,
            from_seq: None,
            to_seq: None,
            broken_at: None,
            last_good_seq: None,
            last_good_hash: None,
            suspect: Vec::new(),
        }
    }
}

/// Append activity of one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorActivity {
    pub actor_id: String,
    pub event_count: u64,
}

/// Event volume on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub event_count: u64,
}

/// Aggregate view over a set of audit records.
///
/// Produced by the reporting tooling for dashboards and operator review;
/// everything here is derivable from an ordered scan, so the summary is as
/// trustworthy as the chain it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Total records summarized.
    pub total_events: u64,

    /// Count per event type, in tag order.
    pub event_types: BTreeMap<String, u64>,

    /// Most active principals, descending by count (ties broken by id).
    pub actor_activity: Vec<ActorActivity>,

    /// Per-day event counts, ascending by date.
    pub daily_activity: Vec<DailyActivity>,
}
