use crate::db::{find_all, find_one, to_document};
use crate::models::Module;
use crate::store::{Collection, DocumentStore, Filter, StoreError};

pub async fn list(
    store: &dyn DocumentStore,
    service_id: Option<&str>,
) -> Result<Vec<Module>, StoreError> {
    let filter = match service_id {
        Some(service_id) => Filter::new().eq("serviceId", service_id),
        None => Filter::new(),
    };
    find_all(store, Collection::Modules, &filter).await
}

pub async fn find_by_id(store: &dyn DocumentStore, id: &str) -> Result<Option<Module>, StoreError> {
    find_one(store, Collection::Modules, &Filter::by_id(id)).await
}

/// Module lookup by name within a service — used to validate references.
pub async fn find_by_name(
    store: &dyn DocumentStore,
    service_id: &str,
    name: &str,
) -> Result<Option<Module>, StoreError> {
    find_one(
        store,
        Collection::Modules,
        &Filter::new().eq("serviceId", service_id).eq("name", name),
    )
    .await
}

pub async fn insert(store: &dyn DocumentStore, module: &Module) -> Result<(), StoreError> {
    store.insert(Collection::Modules, to_document(module)?).await
}

pub async fn save(store: &dyn DocumentStore, module: &Module) -> Result<bool, StoreError> {
    store
        .replace(Collection::Modules, &module.id, to_document(module)?)
        .await
}

pub async fn delete(store: &dyn DocumentStore, id: &str) -> Result<bool, StoreError> {
    let deleted = store
        .delete_many(Collection::Modules, &Filter::by_id(id))
        .await?;
    Ok(deleted > 0)
}
