//! A representative day of clinic activity, as audit events.
//!
//! Used by the CLI's `seed` subcommand and by tests that want a realistic
//! mixed trail instead of hand-rolled fixtures.

use custos_contracts::AuditEvent;

use crate::{auth, auth::RequestContext, consent, encounters, files, patients};

/// Events for one morning at a primary health centre: a clinician logs in,
/// enrolls a patient, records an encounter, uploads a referral letter,
/// updates consent, and logs out; a second clinician reads the record.
pub fn clinic_morning() -> Vec<AuditEvent> {
    let asha = RequestContext {
        ip_address: "10.20.4.17".to_string(),
        user_agent: "custos-kiosk/2.3".to_string(),
        facility: "PHC-Ernakulam-04".to_string(),
    };
    let front_desk = RequestContext {
        ip_address: "10.20.4.31".to_string(),
        user_agent: "Mozilla/5.0".to_string(),
        facility: "PHC-Ernakulam-04".to_string(),
    };

    vec![
        auth::user_login("clin-041", "clinician", &asha),
        patients::patient_enrolled("clin-041", "pat-7781", "Ernakulam", &asha),
        encounters::encounter_created("clin-041", "pat-7781", "enc-30119", "initial_assessment", &asha),
        files::file_uploaded(
            "clin-041",
            "pat-7781",
            "referral-letter.pdf",
            182_400,
            "9f2c7d44c1a06bfe67a2f35c3c4d1d3db1de2f1f36a26a3a6cf4cbb2a45b1d22",
            &asha,
        ),
        consent::consent_updated("clin-041", "pat-7781", "data_sharing", true, &asha),
        auth::user_login("clin-052", "registrar", &front_desk),
        patients::patient_accessed("clin-052", "pat-7781", &front_desk),
        auth::user_logout("clin-041", &asha),
    ]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
