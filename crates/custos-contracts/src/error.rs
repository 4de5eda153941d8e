//! Error types for the CUSTOS audit trail.
//!
//! All fallible operations return `CustosResult<T>`. Note the deliberate
//! asymmetry: a *broken chain* is never an error — verification reports it
//! as a finding in a `VerificationReport`. Errors are reserved for inputs
//! the appender rejects, storage that cannot be reached, and verify
//! requests that name a range the store does not hold.

use thiserror::Error;

/// The unified error type for the CUSTOS crates.
#[derive(Debug, Error)]
pub enum CustosError {
    /// Malformed input to append — rejected before any state change.
    #[error("invalid audit event: {reason}")]
    InvalidEvent { reason: String },

    /// The underlying store cannot be reached or failed mid-operation.
    ///
    /// Fully recoverable by retry; appends are atomic, so no partial state
    /// is left behind.
    #[error("audit store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// A concurrent writer advanced the tail between the read and the write
    /// of an append cycle.
    ///
    /// Internal: the chain appender retries the whole read-compute-write
    /// cycle. Event sources only ever observe `AppendRetriesExhausted`.
    #[error("concurrent append conflict: store expected sequence {expected}, writer supplied {found}")]
    ConcurrentAppend { expected: u64, found: u64 },

    /// The append retry budget was spent without winning the tail race.
    #[error("append abandoned after {attempts} conflicting attempts")]
    AppendRetriesExhausted { attempts: u32 },

    /// A verify request named a starting sequence the store does not hold.
    #[error("sequence {sequence} not found in audit store")]
    RangeNotFound { sequence: u64 },

    /// A configuration value is missing, unreadable, or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the CUSTOS crates.
pub type CustosResult<T> = Result<T, CustosError>;
