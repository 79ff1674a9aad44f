use crate::store::DocumentStore;

/// Log an audit event. This is called explicitly in handlers after mutations.
pub async fn log_event(
    store: &dyn DocumentStore,
    actor: Option<&str>,
    action: &str,
    resource_type: &str,
    resource_id: Option<&str>,
    details: Option<serde_json::Value>,
) {
    if let Err(e) =
        crate::db::audit::log_event(store, actor, action, resource_type, resource_id, details).await
    {
        tracing::error!("Failed to log audit event: {e}");
    }
}
