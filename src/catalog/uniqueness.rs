use crate::error::AppError;
use crate::store::{Collection, DocumentStore, Filter};

/// Reject `name` if another record in `collection` matching `scope` already
/// carries it. `exclude_id` keeps a record from colliding with itself on
/// update.
///
/// This is a plain read followed later by the caller's write, so two
/// concurrent callers can both pass. Only a storage-level unique index closes
/// that window.
pub async fn ensure_unique(
    store: &dyn DocumentStore,
    collection: Collection,
    scope: Filter,
    name: &str,
    exclude_id: Option<&str>,
) -> Result<(), AppError> {
    let mut filter = scope.eq("name", name);
    if let Some(id) = exclude_id {
        filter = filter.ne("id", id);
    }

    if store.find_one(collection, &filter).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "A {} named '{name}' already exists",
            label(collection)
        )));
    }
    Ok(())
}

fn label(collection: Collection) -> &'static str {
    match collection {
        Collection::Services => "service",
        Collection::Modules => "module",
        Collection::Schemas => "schema",
        Collection::Endpoints => "endpoint",
        Collection::ErrorCodes => "error code",
        Collection::OverviewCards => "overview card",
        Collection::AuditEvents => "audit event",
    }
}
