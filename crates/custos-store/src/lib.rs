//! # custos-store
//!
//! `AuditStore` implementations for the CUSTOS audit trail:
//!
//! - [`MemoryStore`] — locked-Vec reference implementation, the semantic
//!   yardstick for every other backend and the workhorse of the test suites.
//! - [`JournalStore`] — durable append-only JSONL file, fsynced per append,
//!   replayed on open.
//!
//! Both enforce the conditional append: a record is accepted only when its
//! sequence is exactly one past the current tail, so racing writers cannot
//! fork the chain even when they bypass the single-writer recorder.

pub mod journal;
pub mod memory;

pub use journal::JournalStore;
pub use memory::MemoryStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
