//! File upload events.

use custos_contracts::{event::event_types, AuditEvent};

use crate::auth::RequestContext;

/// A document was attached to a patient record.
///
/// `content_sha256` is the digest of the uploaded bytes, computed by the
/// storage layer; carrying it in the trail ties the chain to the file's
/// content without storing the file.
pub fn file_uploaded(
    clinician_id: &str,
    patient_id: &str,
    file_name: &str,
    size_bytes: u64,
    content_sha256: &str,
    ctx: &RequestContext,
) -> AuditEvent {
    AuditEvent::new(event_types::FILE_UPLOADED)
        .with_actor(clinician_id)
        .with_subject(patient_id)
        .with_meta("file_name", file_name)
        .with_meta("size_bytes", size_bytes)
        .with_meta("content_sha256", content_sha256)
        .with_meta("ip_address", ctx.ip_address.as_str())
        .with_meta("facility", ctx.facility.as_str())
}
