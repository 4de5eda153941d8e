//! # custos-core
//!
//! The core of the CUSTOS tamper-evident audit trail: the frozen canonical
//! serialization rule, the storage contract, the chain appender with its
//! compare-and-append retry discipline, and the single-writer event
//! recorder.
//!
//! ## Overview
//!
//! Each record commits to its predecessor through `prev_hash`, forming an
//! append-only SHA-256 chain. Editing, reordering, or deleting any record
//! breaks the chain in a way a later replay detects. Two appending
//! disciplines are provided and either suffices:
//!
//! - `AuditChain::append` — optimistic: reads the tail, computes the record,
//!   conditionally appends, and retries the whole cycle on conflict. Safe
//!   for multiple direct writers.
//! - `EventRecorder` — single-writer: one worker thread owns the chain,
//!   fed by a bounded queue. Races are eliminated by construction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custos_core::{AuditChain, EventRecorder};
//! use custos_contracts::AuditEvent;
//!
//! let chain = AuditChain::new(store);
//! let record = chain.append(
//!     AuditEvent::new("USER_LOGIN").with_actor("u1").with_meta("ip", "10.0.0.7"),
//! )?;
//! assert_eq!(record.sequence, 1);
//! ```

pub mod canonical;
pub mod chain;
pub mod config;
pub mod recorder;
pub mod traits;

pub use canonical::{canonical_timestamp, hash_fields, record_hash, CANONICAL_VERSION};
pub use chain::AuditChain;
pub use config::{ChainConfig, CustosConfig, FailurePolicy, RecorderConfig};
pub use recorder::{EventRecorder, RecordOutcome};
pub use traits::AuditStore;
