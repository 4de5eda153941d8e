//! # custos-verify
//!
//! Integrity verification and reporting tooling for the CUSTOS audit trail.
//!
//! The verifier replays a range of the store, recomputing every hash and
//! chain link with the same frozen canonical rule the appender used, and
//! reports the earliest divergence: which record, which of the three checks
//! failed, and the last known-good position. A broken chain is a finding in
//! the report — never an error, never repaired.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custos_verify::IntegrityVerifier;
//! use custos_contracts::VerifyRequest;
//!
//! let report = IntegrityVerifier::new(&store).verify(&VerifyRequest::default())?;
//! if !report.valid {
//!     let broken = report.broken_at.unwrap();
//!     eprintln!("chain broken at {} ({})", broken.sequence, broken.reason);
//! }
//! ```

pub mod summary;
pub mod verifier;

pub use summary::summarize;
pub use verifier::IntegrityVerifier;
