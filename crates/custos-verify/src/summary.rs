//! Aggregate reporting over audit records.
//!
//! Dashboards and operator review want "what happened, who did it, when" at
//! a glance. Everything here is a pure fold over an ordered scan; the
//! output is deterministic so summaries can be diffed across runs.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use custos_contracts::{
    report::{ActorActivity, DailyActivity},
    AuditRecord, AuditSummary,
};

/// Most-active principals reported per summary.
const TOP_ACTOR_LIMIT: usize = 10;

/// Fold a slice of records into an `AuditSummary`.
///
/// Anonymous records (no actor) count toward totals and event types but do
/// not appear in actor activity. Actor ranking is descending by count with
/// ties broken by id, capped at `TOP_ACTOR_LIMIT`.
pub fn summarize(records: &[AuditRecord]) -> AuditSummary {
    let mut event_types: BTreeMap<String, u64> = BTreeMap::new();
    let mut actors: BTreeMap<String, u64> = BTreeMap::new();
    let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();

    for record in records {
        *event_types.entry(record.event_type.clone()).or_insert(0) += 1;
        if let Some(actor) = &record.actor_id {
            *actors.entry(actor.clone()).or_insert(0) += 1;
        }
        *days.entry(record.timestamp.date_naive()).or_insert(0) += 1;
    }

    let mut actor_activity: Vec<ActorActivity> = actors
        .into_iter()
        .map(|(actor_id, event_count)| ActorActivity {
            actor_id,
            event_count,
        })
        .collect();
    // BTreeMap iteration already ordered ids ascending; a stable sort by
    // descending count keeps the id order as the tie-break.
    actor_activity.sort_by(|a, b| b.event_count.cmp(&a.event_count));
    actor_activity.truncate(TOP_ACTOR_LIMIT);

    let daily_activity: Vec<DailyActivity> = days
        .into_iter()
        .map(|(date, event_count)| DailyActivity { date, event_count })
        .collect();

    AuditSummary {
        total_events: records.len() as u64,
        event_types,
        actor_activity,
        daily_activity,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
