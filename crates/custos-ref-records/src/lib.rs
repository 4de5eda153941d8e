//! # custos-ref-records
//!
//! Reference event constructors for the record-keeping flows CUSTOS audits:
//! authentication, patient enrollment and access, encounters, consent
//! changes, and file uploads.
//!
//! Each function builds a well-formed `AuditEvent` with the metadata the
//! surrounding system records for that flow. Keeping the vocabulary here —
//! rather than scattered across call sites — is what keeps trail queries
//! and summaries meaningful: one flow, one tag, one metadata shape.

pub mod auth;
pub mod consent;
pub mod encounters;
pub mod files;
pub mod patients;
pub mod walkthrough;

pub use auth::RequestContext;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use custos_contracts::MetadataValue;

    use super::auth::RequestContext;
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext {
            ip_address: "10.0.0.7".to_string(),
            user_agent: "test-agent".to_string(),
            facility: "PHC-01".to_string(),
        }
    }

    /// Constructors attach the actor and subject the flow implies.
    #[test]
    fn access_events_carry_actor_and_subject() {
        let event = patients::patient_accessed("clin-1", "pat-9", &ctx());
        assert_eq!(event.event_type, "PATIENT_ACCESSED");
        assert_eq!(event.actor_id.as_deref(), Some("clin-1"));
        assert_eq!(event.subject_id.as_deref(), Some("pat-9"));
        assert_eq!(
            event.metadata.get("ip_address"),
            Some(&MetadataValue::from("10.0.0.7"))
        );
    }

    /// Account-level events have no subject record.
    #[test]
    fn login_has_no_subject() {
        let event = auth::user_login("u1", "clinician", &ctx());
        assert_eq!(event.subject_id, None);
        assert_eq!(
            event.metadata.get("login_method"),
            Some(&MetadataValue::from("password"))
        );
    }

    /// Update events name the touched fields, never their values.
    #[test]
    fn update_metadata_names_fields_only() {
        let event = patients::patient_updated("clin-1", "pat-9", &["phone", "address"], &ctx());
        assert_eq!(
            event.metadata.get("changed_fields"),
            Some(&MetadataValue::from("phone,address"))
        );
    }

    /// Consent events carry the new state as a typed boolean.
    #[test]
    fn consent_state_is_a_boolean() {
        let event = consent::consent_updated("clin-1", "pat-9", "data_sharing", false, &ctx());
        assert_eq!(
            event.metadata.get("granted"),
            Some(&MetadataValue::Bool(false))
        );
    }

    /// Upload events tie the trail to the file content by digest.
    #[test]
    fn upload_carries_size_and_digest() {
        let event = files::file_uploaded("clin-1", "pat-9", "scan.pdf", 2048, &"ab".repeat(32), &ctx());
        assert_eq!(
            event.metadata.get("size_bytes"),
            Some(&MetadataValue::Int(2048))
        );
        assert_eq!(
            event.metadata.get("content_sha256"),
            Some(&MetadataValue::from("ab".repeat(32)))
        );
    }
}
