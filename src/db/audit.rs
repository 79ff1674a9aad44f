use chrono::Utc;

use crate::db::{new_id, to_document};
use crate::models::AuditEvent;
use crate::store::{Collection, DocumentStore, StoreError};

pub async fn log_event(
    store: &dyn DocumentStore,
    actor: Option<&str>,
    action: &str,
    resource_type: &str,
    resource_id: Option<&str>,
    details: Option<serde_json::Value>,
) -> Result<(), StoreError> {
    let event = AuditEvent {
        id: new_id(),
        actor: actor.map(str::to_string),
        action: action.to_string(),
        resource_type: resource_type.to_string(),
        resource_id: resource_id.map(str::to_string),
        details,
        created_at: Utc::now(),
    };
    store
        .insert(Collection::AuditEvents, to_document(&event)?)
        .await
}
