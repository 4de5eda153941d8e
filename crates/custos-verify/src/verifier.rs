//! Chain replay and break classification.
//!
//! Verification is an ordered scan that recomputes what the appender
//! computed and compares it to what the store returned. Three checks run
//! per record, in a fixed priority order, and the first failure names the
//! break:
//!
//!   1. sequence — the record carries the expected next integer (a miss
//!      means a record was deleted from the run);
//!   2. chain link — `prev_hash` equals the running expected hash (a miss
//!      means reordering, insertion, or replacement relative to neighbors);
//!   3. content — the stored `hash` equals the hash recomputed from the
//!      record's own fields via the frozen canonical rule (a miss means the
//!      record was edited in place).
//!
//! Verification is pure: it reads, recomputes, and reports. It never
//! repairs, and it embeds no wall-clock time, so identical stores produce
//! byte-identical reports.

use tracing::{debug, warn};

use custos_contracts::{
    BreakReason, ChainBreak, CustosError, CustosResult, VerificationReport, VerifyRequest,
    FIRST_SEQUENCE, GENESIS_PREV_HASH,
};
use custos_core::{record_hash, AuditStore};

/// Replays ranges of an `AuditStore` and reports the earliest divergence.
///
/// Holds only a store reference; runs concurrently with appends and with
/// other verifications without locking. A run racing an in-flight append
/// simply may not observe the newest record — the report's `to_seq` states
/// what was actually scanned.
pub struct IntegrityVerifier<'s, S: AuditStore> {
    store: &'s S,
}

impl<'s, S: AuditStore> IntegrityVerifier<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Verify the requested range.
    ///
    /// The expected predecessor hash is seeded from the genesis sentinel
    /// when the scan starts at the first sequence, or from the caller's
    /// anchor for a suffix scan. A suffix scan without an anchor leaves the
    /// first record's chain link unchecked (logged as a warning): its
    /// content and everything after it are still fully verified, but the
    /// link into the unscanned prefix rests on the store's word alone.
    ///
    /// # Errors
    ///
    /// - `RangeNotFound` — `from_seq` names a sequence the store does not
    ///   hold, or the bounds are reversed. An explicit range is never
    ///   satisfied by silently verifying nothing.
    /// - `StoreUnavailable` — the scan itself failed; nothing was verified.
    pub fn verify(&self, request: &VerifyRequest) -> CustosResult<VerificationReport> {
        let records = match request.from_seq {
            Some(from) => {
                if request.to_seq.is_some_and(|to| to < from) {
                    return Err(CustosError::RangeNotFound { sequence: from });
                }
                let records = self.store.scan(from, request.to_seq)?;
                match records.first() {
                    Some(first) if first.sequence == from => records,
                    _ => return Err(CustosError::RangeNotFound { sequence: from }),
                }
            }
            None => self.store.scan(FIRST_SEQUENCE, request.to_seq)?,
        };

        let Some(first) = records.first() else {
            return Ok(VerificationReport::empty());
        };
        let first_seq = first.sequence;

        // None = unknown seed: suffix scan without an anchor.
        let mut expected_prev: Option<String> = match (&request.anchor, first_seq) {
            (Some(anchor), _) => Some(anchor.clone()),
            (None, FIRST_SEQUENCE) => Some(GENESIS_PREV_HASH.to_string()),
            (None, from) => {
                warn!(
                    from,
                    "suffix verification without anchor; first chain link unchecked"
                );
                None
            }
        };

        let mut expected_seq = first_seq;
        let mut checked: u64 = 0;
        let mut scanned_to = first_seq;
        let mut broken: Option<ChainBreak> = None;
        let mut suspect: Vec<u64> = Vec::new();
        let mut last_good: Option<(u64, String)> = None;

        for record in &records {
            scanned_to = record.sequence;

            if broken.is_some() {
                // The chain is already broken; everything past the break is
                // flagged, not classified — arbitrary content could have
                // been substituted after the break.
                suspect.push(record.sequence);
                continue;
            }

            checked += 1;

            let reason = if record.sequence != expected_seq {
                Some(BreakReason::SequenceGap)
            } else if expected_prev
                .as_deref()
                .is_some_and(|prev| prev != record.prev_hash)
            {
                Some(BreakReason::ChainMismatch)
            } else if record_hash(record) != record.hash {
                Some(BreakReason::ContentMismatch)
            } else {
                None
            };

            match reason {
                Some(reason) => {
                    debug!(sequence = record.sequence, %reason, "chain break detected");
                    broken = Some(ChainBreak {
                        sequence: record.sequence,
                        reason,
                    });
                    if !request.full_report {
                        break;
                    }
                }
                None => {
                    expected_seq = record.sequence + 1;
                    expected_prev = Some(record.hash.clone());
                    last_good = Some((record.sequence, record.hash.clone()));
                }
            }
        }

        Ok(VerificationReport {
            valid: broken.is_none(),
            checked_count: checked,
            from_seq: Some(first_seq),
            to_seq: Some(scanned_to),
            broken_at: broken,
            last_good_seq: last_good.as_ref().map(|(seq, _)| *seq),
            last_good_hash: last_good.map(|(_, hash)| hash),
            suspect,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use custos_contracts::{AuditEvent, AuditRecord};
    use custos_core::AuditChain;
    use custos_store::MemoryStore;

    use super::*;

    /// Build a store holding `n` chained records.
    fn seeded_store(n: usize) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let chain = AuditChain::new(store.clone());
        for i in 0..n {
            chain
                .append(
                    AuditEvent::new("RECORD_ACCESSED")
                        .with_actor(format!("u{}", i % 3))
                        .with_subject(format!("p{}", i)),
                )
                .unwrap();
        }
        store
    }

    /// Rebuild a store from a mutated copy of another store's records.
    fn rebuilt<F>(store: &MemoryStore, mutate: F) -> MemoryStore
    where
        F: FnOnce(&mut Vec<AuditRecord>),
    {
        let mut records = store.snapshot().unwrap();
        mutate(&mut records);
        MemoryStore::from_records(records)
    }

    fn verify_all(store: &MemoryStore) -> VerificationReport {
        IntegrityVerifier::new(store)
            .verify(&VerifyRequest::default())
            .unwrap()
    }

    // ── Valid chains ─────────────────────────────────────────────────────────

    /// N appends by a single writer verify end to end.
    #[test]
    fn sequential_appends_verify_valid() {
        let store = seeded_store(5);
        let report = verify_all(&store);

        assert!(report.valid);
        assert_eq!(report.checked_count, 5);
        assert_eq!(report.from_seq, Some(1));
        assert_eq!(report.to_seq, Some(5));
        assert_eq!(report.broken_at, None);
        assert_eq!(report.last_good_seq, Some(5));
        assert_eq!(
            report.last_good_hash,
            Some(store.tail().unwrap().unwrap().hash)
        );
    }

    /// An empty store verifies as trivially valid.
    #[test]
    fn empty_store_is_trivially_valid() {
        let store = MemoryStore::new();
        let report = verify_all(&store);
        assert!(report.valid);
        assert_eq!(report.checked_count, 0);
        assert_eq!(report.from_seq, None);
    }

    /// Running verification twice over an unmodified store yields
    /// byte-identical reports.
    #[test]
    fn verification_is_idempotent() {
        let store = seeded_store(4);
        let a = serde_json::to_vec(&verify_all(&store)).unwrap();
        let b = serde_json::to_vec(&verify_all(&store)).unwrap();
        assert_eq!(a, b);
    }

    // ── Content tampering ────────────────────────────────────────────────────

    /// The documented two-record walkthrough: LOGIN then RECORD_ACCESSED,
    /// then an in-place edit of record 1's actor.
    #[test]
    fn content_edit_is_reported_at_the_edited_record() {
        let store = Arc::new(MemoryStore::new());
        let chain = AuditChain::new(store.clone());

        let first = chain
            .append(AuditEvent::new("LOGIN").with_actor("u1"))
            .unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(first.prev_hash, GENESIS_PREV_HASH);

        let second = chain
            .append(
                AuditEvent::new("RECORD_ACCESSED")
                    .with_actor("u1")
                    .with_subject("p1"),
            )
            .unwrap();
        assert_eq!(second.sequence, 2);
        assert_eq!(second.prev_hash, first.hash);

        let clean = verify_all(&store);
        assert!(clean.valid);
        assert_eq!(clean.checked_count, 2);

        // Overwrite record 1's actor directly in the store, hash untouched.
        let tampered = rebuilt(&store, |records| {
            records[0].actor_id = Some("u9".to_string());
        });

        let report = verify_all(&tampered);
        assert!(!report.valid);
        assert_eq!(
            report.broken_at,
            Some(ChainBreak {
                sequence: 1,
                reason: BreakReason::ContentMismatch,
            })
        );
        assert_eq!(report.last_good_seq, None);
    }

    /// Editing any middle record's metadata breaks exactly there.
    #[test]
    fn metadata_edit_breaks_at_the_record() {
        let store = seeded_store(5);
        let tampered = rebuilt(&store, |records| {
            records[2]
                .metadata
                .insert("injected".to_string(), "late".into());
        });

        let report = verify_all(&tampered);
        assert_eq!(
            report.broken_at,
            Some(ChainBreak {
                sequence: 3,
                reason: BreakReason::ContentMismatch,
            })
        );
        assert_eq!(report.last_good_seq, Some(2));
        assert_eq!(report.checked_count, 3);
    }

    /// A record whose prev_hash is rewritten fails its own content check —
    /// prev_hash participates in the record's hash.
    #[test]
    fn prev_hash_edit_fails_content_check() {
        let store = seeded_store(3);
        let tampered = rebuilt(&store, |records| {
            records[1].prev_hash = "00".repeat(32);
        });

        let report = verify_all(&tampered);
        assert!(!report.valid);
        assert_eq!(report.broken_at.unwrap().sequence, 2);
    }

    // ── Deletion and reordering ──────────────────────────────────────────────

    /// Deleting record k surfaces at k+1: its sequence no longer matches
    /// the expected next integer.
    #[test]
    fn deletion_is_reported_at_the_successor() {
        let store = seeded_store(5);
        let tampered = rebuilt(&store, |records| {
            records.remove(2); // sequence 3
        });

        let report = verify_all(&tampered);
        assert_eq!(
            report.broken_at,
            Some(ChainBreak {
                sequence: 4,
                reason: BreakReason::SequenceGap,
            })
        );
        assert_eq!(report.last_good_seq, Some(2));
    }

    /// Swapping two records and relabeling their sequences to look gapless
    /// is still caught: the chain links no longer match.
    #[test]
    fn relabeled_reordering_is_a_chain_mismatch() {
        let store = seeded_store(4);
        let tampered = rebuilt(&store, |records| {
            records.swap(1, 2);
            records[1].sequence = 2;
            records[2].sequence = 3;
        });

        let report = verify_all(&tampered);
        assert!(!report.valid);
        assert_eq!(
            report.broken_at,
            Some(ChainBreak {
                sequence: 2,
                reason: BreakReason::ChainMismatch,
            })
        );
    }

    /// Truncating the tail is undetectable by replay alone — the remaining
    /// prefix is a valid chain. The defense is the anchor from a previous
    /// report, which names the expected tail.
    #[test]
    fn tail_truncation_leaves_a_valid_prefix() {
        let store = seeded_store(5);
        let truncated = rebuilt(&store, |records| {
            records.truncate(3);
        });

        let report = verify_all(&truncated);
        assert!(report.valid);
        assert_eq!(report.to_seq, Some(3));
        // The operator compares to_seq/last_good_hash against the anchor
        // from the previous run to notice the missing suffix.
    }

    // ── Ranges and anchors ───────────────────────────────────────────────────

    /// A from_seq the store does not hold is an error, not an empty pass.
    #[test]
    fn missing_from_seq_is_range_not_found() {
        let store = seeded_store(3);
        let err = IntegrityVerifier::new(&*store)
            .verify(&VerifyRequest {
                from_seq: Some(10),
                ..VerifyRequest::default()
            })
            .unwrap_err();
        assert!(matches!(err, CustosError::RangeNotFound { sequence: 10 }));
    }

    /// Reversed bounds are rejected the same way.
    #[test]
    fn reversed_bounds_are_range_not_found() {
        let store = seeded_store(3);
        let err = IntegrityVerifier::new(&*store)
            .verify(&VerifyRequest {
                from_seq: Some(3),
                to_seq: Some(1),
                ..VerifyRequest::default()
            })
            .unwrap_err();
        assert!(matches!(err, CustosError::RangeNotFound { .. }));
    }

    /// A suffix verified against the previous run's anchor passes, and a
    /// wrong anchor is a chain mismatch at the suffix head.
    #[test]
    fn anchored_suffix_verification() {
        let store = seeded_store(5);
        let anchor = store.get(2).unwrap().unwrap().hash;

        let verifier = IntegrityVerifier::new(&*store);

        let good = verifier
            .verify(&VerifyRequest {
                from_seq: Some(3),
                anchor: Some(anchor),
                ..VerifyRequest::default()
            })
            .unwrap();
        assert!(good.valid);
        assert_eq!(good.from_seq, Some(3));
        assert_eq!(good.checked_count, 3);

        let bad = verifier
            .verify(&VerifyRequest {
                from_seq: Some(3),
                anchor: Some("ff".repeat(32)),
                ..VerifyRequest::default()
            })
            .unwrap();
        assert!(!bad.valid);
        assert_eq!(
            bad.broken_at,
            Some(ChainBreak {
                sequence: 3,
                reason: BreakReason::ChainMismatch,
            })
        );
    }

    /// A fully valid run hands back a fresh anchor for the next increment.
    #[test]
    fn incremental_verification_chains_on_last_good_hash() {
        let store = Arc::new(MemoryStore::new());
        let chain = AuditChain::new(store.clone());
        for _ in 0..3 {
            chain.append(AuditEvent::new("USER_LOGIN")).unwrap();
        }

        let first_pass = verify_all(&store);
        assert!(first_pass.valid);

        for _ in 0..2 {
            chain.append(AuditEvent::new("USER_LOGOUT")).unwrap();
        }

        let second_pass = IntegrityVerifier::new(&*store)
            .verify(&VerifyRequest {
                from_seq: Some(first_pass.to_seq.unwrap() + 1),
                anchor: first_pass.last_good_hash,
                ..VerifyRequest::default()
            })
            .unwrap();
        assert!(second_pass.valid);
        assert_eq!(second_pass.checked_count, 2);
    }

    /// Without an anchor a suffix still verifies content and internal
    /// links; only the link into the unscanned prefix is unchecked.
    #[test]
    fn unanchored_suffix_checks_everything_but_the_first_link() {
        let store = seeded_store(4);

        let report = IntegrityVerifier::new(&*store)
            .verify(&VerifyRequest {
                from_seq: Some(3),
                ..VerifyRequest::default()
            })
            .unwrap();
        assert!(report.valid);
        assert_eq!(report.checked_count, 2);
    }

    // ── Full report mode ─────────────────────────────────────────────────────

    /// With full_report the scan continues past the break and flags the
    /// remainder as suspect.
    #[test]
    fn full_report_flags_suspects_past_the_break() {
        let store = seeded_store(5);
        let tampered = rebuilt(&store, |records| {
            records[1].subject_id = Some("someone-else".to_string());
        });

        let report = IntegrityVerifier::new(&tampered)
            .verify(&VerifyRequest {
                full_report: true,
                ..VerifyRequest::default()
            })
            .unwrap();

        assert!(!report.valid);
        assert_eq!(report.broken_at.unwrap().sequence, 2);
        assert_eq!(report.checked_count, 2);
        assert_eq!(report.suspect, vec![3, 4, 5]);
        assert_eq!(report.to_seq, Some(5));
    }
}
