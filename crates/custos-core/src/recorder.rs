//! Single-writer event recorder.
//!
//! The simplest way to serialize appends is to stop sharing the tail: one
//! worker thread owns the chain appender, and event sources submit through a
//! bounded channel. Races are eliminated by construction — the conditional
//! append in the store then acts as a backstop rather than a hot path.
//!
//! The recorder is also where the on-audit-failure policy lives. Whether a
//! failed audit write may sink the business operation that triggered it is
//! the operator's call, made explicitly in configuration — never an implicit
//! swallowed exception.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use custos_contracts::{AuditEvent, AuditRecord, CustosError, CustosResult};

use crate::chain::AuditChain;
use crate::config::{FailurePolicy, RecorderConfig};
use crate::traits::AuditStore;

/// What happened to a submitted event.
#[derive(Debug)]
pub enum RecordOutcome {
    /// The event was appended; here is its record.
    Recorded(AuditRecord),
    /// The append failed at the storage layer and the `allow` policy
    /// suppressed the error. The failure was logged; the trail has a gap.
    Suppressed,
}

struct Job {
    event: AuditEvent,
    reply: mpsc::SyncSender<CustosResult<AuditRecord>>,
}

/// Owns the append side of a chain behind a bounded queue.
///
/// Submissions block while the queue is full, which back-pressures event
/// sources instead of dropping events. Dropping the recorder closes the
/// queue and joins the worker, so every accepted event is appended (or
/// answered with an error) before shutdown completes.
pub struct EventRecorder {
    tx: Option<mpsc::SyncSender<Job>>,
    worker: Option<JoinHandle<()>>,
    policy: FailurePolicy,
}

impl EventRecorder {
    /// Start the worker thread that owns `chain`.
    pub fn spawn<S: AuditStore + 'static>(
        chain: AuditChain<S>,
        config: RecorderConfig,
    ) -> CustosResult<Self> {
        let (tx, rx) = mpsc::sync_channel::<Job>(config.queue_depth);

        let worker = thread::Builder::new()
            .name("custos-recorder".to_string())
            .spawn(move || {
                for job in rx {
                    let result = chain.append(job.event);
                    // The submitter may have given up waiting; its absence
                    // does not affect the already-completed append.
                    let _ = job.reply.send(result);
                }
                info!("event recorder drained and stopped");
            })
            .map_err(|e| CustosError::ConfigError {
                reason: format!("failed to spawn recorder thread: {}", e),
            })?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            policy: config.on_audit_failure,
        })
    }

    /// Submit one event and wait for the worker's answer.
    ///
    /// `InvalidEvent` always propagates — a malformed event is a caller bug,
    /// not an audit outage, and no policy may hide it. Storage-layer
    /// failures follow the configured policy: `Block` propagates them,
    /// `Allow` logs and reports `RecordOutcome::Suppressed`.
    pub fn record(&self, event: AuditEvent) -> CustosResult<RecordOutcome> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);

        let tx = self.tx.as_ref().expect("sender present until drop");
        tx.send(Job {
            event,
            reply: reply_tx,
        })
        .map_err(|_| CustosError::StoreUnavailable {
            reason: "event recorder worker has stopped".to_string(),
        })?;

        let result = reply_rx.recv().map_err(|_| CustosError::StoreUnavailable {
            reason: "event recorder worker stopped before replying".to_string(),
        })?;

        match result {
            Ok(record) => Ok(RecordOutcome::Recorded(record)),
            Err(err @ CustosError::InvalidEvent { .. }) => Err(err),
            Err(err) => match self.policy {
                FailurePolicy::Block => Err(err),
                FailurePolicy::Allow => {
                    error!(error = %err, "audit append failed; continuing per allow policy");
                    Ok(RecordOutcome::Suppressed)
                }
            },
        }
    }
}

impl Drop for EventRecorder {
    fn drop(&mut self) {
        // Closing the channel ends the worker's loop once the queue drains.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
