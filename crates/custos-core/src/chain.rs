//! The chain appender: turns events into hash-linked records.
//!
//! Every record's `sequence` and `prev_hash` derive from the current tail,
//! so the read of the tail and the write of the new record must be atomic
//! with respect to other appenders. The store enforces that atomicity with
//! its conditional append; this module enforces the matching discipline on
//! the writer side — on conflict the WHOLE read-compute-write cycle is
//! retried, never just the write, because a stale `prev_hash` written blind
//! would fork the chain.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use custos_contracts::{
    AuditEvent, AuditRecord, CustosError, CustosResult, RecordId, FIRST_SEQUENCE,
    GENESIS_PREV_HASH,
};

use crate::canonical::{hash_fields, truncate_to_micros};
use crate::config::ChainConfig;
use crate::traits::AuditStore;

/// Appends events to an `AuditStore` under the chain discipline.
///
/// Cheap to clone-share via the inner `Arc`; multiple threads may call
/// `append` concurrently — the conditional store append plus the full-cycle
/// retry guarantee a single linear chain regardless of interleaving.
pub struct AuditChain<S: AuditStore> {
    store: Arc<S>,
    config: ChainConfig,
}

impl<S: AuditStore> AuditChain<S> {
    /// Create an appender with default tuning.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, ChainConfig::default())
    }

    /// Create an appender with explicit tuning.
    pub fn with_config(store: Arc<S>, config: ChainConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Append one event to the chain.
    ///
    /// Validates the event, then runs the read-compute-write cycle:
    /// read the tail, assign `sequence = tail + 1`, `prev_hash = tail.hash`
    /// (or the genesis values on an empty store), stamp the timestamp,
    /// hash the canonical serialization, and conditionally append. A
    /// `ConcurrentAppend` rejection restarts the cycle from the tail read;
    /// after `max_append_retries` losing attempts the append fails with
    /// `AppendRetriesExhausted`.
    ///
    /// The assigned timestamp is truncated to microseconds and clamped to be
    /// non-decreasing relative to the tail, so chain order and timestamp
    /// order cannot disagree even under clock adjustment.
    ///
    /// # Errors
    ///
    /// - `InvalidEvent` — empty or ill-formed `event_type`; nothing written.
    /// - `StoreUnavailable` — the store could not be reached; nothing
    ///   written, safe to retry.
    /// - `AppendRetriesExhausted` — the retry budget was spent losing tail
    ///   races.
    pub fn append(&self, event: AuditEvent) -> CustosResult<AuditRecord> {
        event.validate()?;

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;

            let tail = self.store.tail()?;
            let (sequence, prev_hash, floor) = match &tail {
                Some(t) => (t.sequence + 1, t.hash.clone(), Some(t.timestamp)),
                None => (FIRST_SEQUENCE, GENESIS_PREV_HASH.to_string(), None),
            };

            // Clamp to the tail's timestamp so the chain's timestamps are
            // monotonically non-decreasing even if the wall clock stepped back.
            let now = truncate_to_micros(Utc::now());
            let timestamp = match floor {
                Some(f) if now < f => f,
                _ => now,
            };

            let hash = hash_fields(
                &event.event_type,
                event.actor_id.as_deref(),
                event.subject_id.as_deref(),
                &timestamp,
                &event.metadata,
                &prev_hash,
            );

            let record = AuditRecord {
                record_id: RecordId::new(),
                sequence,
                event_type: event.event_type.clone(),
                actor_id: event.actor_id.clone(),
                subject_id: event.subject_id.clone(),
                metadata: event.metadata.clone(),
                timestamp,
                prev_hash,
                hash,
            };

            match self.store.append(record.clone()) {
                Ok(()) => {
                    debug!(
                        sequence = record.sequence,
                        event_type = %record.event_type,
                        attempts,
                        "audit record appended"
                    );
                    return Ok(record);
                }
                Err(CustosError::ConcurrentAppend { expected, found }) => {
                    if attempts >= self.config.max_append_retries {
                        warn!(
                            event_type = %event.event_type,
                            attempts,
                            "append retry budget exhausted"
                        );
                        return Err(CustosError::AppendRetriesExhausted { attempts });
                    }
                    debug!(
                        expected,
                        found, attempts, "tail advanced during append, retrying full cycle"
                    );
                }
                Err(other) => return Err(other),
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
