//! # custos-contracts
//!
//! Shared types, reports, and error contracts for the CUSTOS audit trail.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, validation of those definitions, and
//! error types.

pub mod error;
pub mod event;
pub mod query;
pub mod record;
pub mod report;

pub use error::{CustosError, CustosResult};
pub use event::{AuditEvent, Metadata, MetadataValue};
pub use query::{AuditQuery, VerifyRequest};
pub use record::{AuditRecord, RecordId, FIRST_SEQUENCE, GENESIS_PREV_HASH};
pub use report::{AuditSummary, BreakReason, ChainBreak, VerificationReport};

// ── Tests ─────────────────────────────────────────────────────────────────────
