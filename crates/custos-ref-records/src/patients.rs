//! Patient enrollment and record-access events.

use custos_contracts::{event::event_types, AuditEvent};

use crate::auth::RequestContext;

/// A patient was enrolled into the registry.
pub fn patient_enrolled(
    clinician_id: &str,
    patient_id: &str,
    district: &str,
    ctx: &RequestContext,
) -> AuditEvent {
    AuditEvent::new(event_types::PATIENT_ENROLLED)
        .with_actor(clinician_id)
        .with_subject(patient_id)
        .with_meta("enrollment_method", "manual")
        .with_meta("district", district)
        .with_meta("ip_address", ctx.ip_address.as_str())
        .with_meta("user_agent", ctx.user_agent.as_str())
        .with_meta("facility", ctx.facility.as_str())
}

/// A patient's record was opened for reading.
pub fn patient_accessed(clinician_id: &str, patient_id: &str, ctx: &RequestContext) -> AuditEvent {
    AuditEvent::new(event_types::PATIENT_ACCESSED)
        .with_actor(clinician_id)
        .with_subject(patient_id)
        .with_meta("ip_address", ctx.ip_address.as_str())
        .with_meta("facility", ctx.facility.as_str())
}

/// A patient's demographics were updated. `changed_fields` names what was
/// touched, never the values — the trail records that a change happened,
/// not the data itself.
pub fn patient_updated(
    clinician_id: &str,
    patient_id: &str,
    changed_fields: &[&str],
    ctx: &RequestContext,
) -> AuditEvent {
    AuditEvent::new(event_types::PATIENT_UPDATED)
        .with_actor(clinician_id)
        .with_subject(patient_id)
        .with_meta("changed_fields", changed_fields.join(","))
        .with_meta("ip_address", ctx.ip_address.as_str())
        .with_meta("facility", ctx.facility.as_str())
}

/// A record was accessed under the break-glass emergency path — no consent
/// check was performed, which is exactly why it must be on the trail.
pub fn emergency_access(
    clinician_id: &str,
    patient_id: &str,
    justification: &str,
    ctx: &RequestContext,
) -> AuditEvent {
    AuditEvent::new(event_types::EMERGENCY_ACCESS)
        .with_actor(clinician_id)
        .with_subject(patient_id)
        .with_meta("justification", justification)
        .with_meta("ip_address", ctx.ip_address.as_str())
        .with_meta("facility", ctx.facility.as_str())
}
