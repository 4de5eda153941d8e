//! Consent change events.

use custos_contracts::{event::event_types, AuditEvent};

use crate::auth::RequestContext;

/// A patient's data-sharing consent changed.
///
/// `scope` names what the consent covers (e.g. `data_sharing`,
/// `emergency_access`); `granted` is the new state.
pub fn consent_updated(
    actor_id: &str,
    patient_id: &str,
    scope: &str,
    granted: bool,
    ctx: &RequestContext,
) -> AuditEvent {
    AuditEvent::new(event_types::CONSENT_UPDATED)
        .with_actor(actor_id)
        .with_subject(patient_id)
        .with_meta("scope", scope)
        .with_meta("granted", granted)
        .with_meta("ip_address", ctx.ip_address.as_str())
        .with_meta("facility", ctx.facility.as_str())
}
