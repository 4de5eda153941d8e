//! Authentication and account events.

use custos_contracts::{event::event_types, AuditEvent};

/// Request context every authenticated flow carries.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub ip_address: String,
    pub user_agent: String,
    pub facility: String,
}

impl RequestContext {
    fn apply(&self, event: AuditEvent) -> AuditEvent {
        event
            .with_meta("ip_address", self.ip_address.as_str())
            .with_meta("user_agent", self.user_agent.as_str())
            .with_meta("facility", self.facility.as_str())
    }
}

/// A user authenticated with a password.
pub fn user_login(user_id: &str, role: &str, ctx: &RequestContext) -> AuditEvent {
    ctx.apply(
        AuditEvent::new(event_types::USER_LOGIN)
            .with_actor(user_id)
            .with_meta("login_method", "password")
            .with_meta("role", role),
    )
}

/// A user ended their session.
pub fn user_logout(user_id: &str, ctx: &RequestContext) -> AuditEvent {
    ctx.apply(AuditEvent::new(event_types::USER_LOGOUT).with_actor(user_id))
}

/// A new staff account was created. `registered_by` is absent for
/// self-service registration.
pub fn user_registered(
    user_id: &str,
    role: &str,
    registered_by: Option<&str>,
    ctx: &RequestContext,
) -> AuditEvent {
    let mut event = AuditEvent::new(event_types::USER_REGISTERED)
        .with_actor(registered_by.unwrap_or(user_id))
        .with_subject(user_id)
        .with_meta("role", role);
    if let Some(by) = registered_by {
        event = event.with_meta("registered_by", by);
    }
    ctx.apply(event)
}

/// A user changed their password.
pub fn password_changed(user_id: &str, ctx: &RequestContext) -> AuditEvent {
    ctx.apply(AuditEvent::new(event_types::PASSWORD_CHANGED).with_actor(user_id))
}

/// A session token was refreshed. System-triggered: no interactive actor
/// context beyond the user the token belongs to.
pub fn token_refreshed(user_id: &str, ctx: &RequestContext) -> AuditEvent {
    ctx.apply(AuditEvent::new(event_types::TOKEN_REFRESHED).with_actor(user_id))
}
