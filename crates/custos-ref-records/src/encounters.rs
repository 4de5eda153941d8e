//! Clinical encounter events.

use custos_contracts::{event::event_types, AuditEvent};

use crate::auth::RequestContext;

/// A clinical encounter was recorded against a patient.
pub fn encounter_created(
    clinician_id: &str,
    patient_id: &str,
    encounter_id: &str,
    encounter_type: &str,
    ctx: &RequestContext,
) -> AuditEvent {
    AuditEvent::new(event_types::ENCOUNTER_CREATED)
        .with_actor(clinician_id)
        .with_subject(patient_id)
        .with_meta("encounter_id", encounter_id)
        .with_meta("encounter_type", encounter_type)
        .with_meta("facility", ctx.facility.as_str())
        .with_meta("ip_address", ctx.ip_address.as_str())
}
