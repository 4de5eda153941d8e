//! TOML-loaded runtime configuration.
//!
//! Everything has a sensible default; a missing config file is not an error
//! for callers that construct `CustosConfig::default()` themselves.

use std::path::Path;

use serde::{Deserialize, Serialize};

use custos_contracts::{CustosError, CustosResult};

/// What the recorder does when an append fails at the storage layer.
///
/// The surrounding system historically swallowed audit failures so the
/// triggering business operation still succeeded. That is a policy decision,
/// not an accident, so it is configurable and explicit here:
///
/// ```toml
/// [recorder]
/// on-audit-failure = "block"   # audit failure fails the business operation
/// on-audit-failure = "allow"   # log the failure, let the operation proceed
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Surface append errors to the caller. The default: an event that
    /// cannot be audited fails the operation that triggered it.
    #[default]
    Block,
    /// Log append errors and report the event as suppressed. The caller's
    /// operation proceeds; the gap in the trail is the operator's accepted
    /// risk.
    Allow,
}

/// Tuning for the chain appender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ChainConfig {
    /// How many full read-compute-write cycles to attempt before giving up
    /// with `AppendRetriesExhausted`. Each retry re-reads the tail, so this
    /// bounds time spent losing races, not blind re-writes.
    pub max_append_retries: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_append_retries: 8,
        }
    }
}

/// Tuning for the single-writer event recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RecorderConfig {
    /// Bounded depth of the append queue. Submitters block when it is full.
    pub queue_depth: usize,

    /// Policy applied to storage-layer append failures.
    pub on_audit_failure: FailurePolicy,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            queue_depth: 256,
            on_audit_failure: FailurePolicy::Block,
        }
    }
}

/// Top-level configuration, deserialized from TOML.
///
/// ```toml
/// [chain]
/// max-append-retries = 8
///
/// [recorder]
/// queue-depth = 256
/// on-audit-failure = "block"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CustosConfig {
    pub chain: ChainConfig,
    pub recorder: RecorderConfig,
}

impl CustosConfig {
    /// Parse `s` as TOML configuration.
    pub fn from_toml_str(s: &str) -> CustosResult<Self> {
        toml::from_str(s).map_err(|e| CustosError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> CustosResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CustosError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = CustosConfig::from_toml_str("").unwrap();
        assert_eq!(config, CustosConfig::default());
        assert_eq!(config.chain.max_append_retries, 8);
        assert_eq!(config.recorder.queue_depth, 256);
        assert_eq!(config.recorder.on_audit_failure, FailurePolicy::Block);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = CustosConfig::from_toml_str(
            r#"
            [recorder]
            on-audit-failure = "allow"
            "#,
        )
        .unwrap();

        assert_eq!(config.recorder.on_audit_failure, FailurePolicy::Allow);
        assert_eq!(config.recorder.queue_depth, 256);
        assert_eq!(config.chain.max_append_retries, 8);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = CustosConfig::from_toml_str("[recorder\nqueue-depth = ").unwrap_err();
        assert!(matches!(err, CustosError::ConfigError { .. }));
    }

    #[test]
    fn unknown_failure_policy_is_rejected() {
        let err = CustosConfig::from_toml_str(
            r#"
            [recorder]
            on-audit-failure = "shrug"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CustosError::ConfigError { .. }));
    }
}
