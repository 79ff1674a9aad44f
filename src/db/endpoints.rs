use serde_json::{Map, Value};

use crate::db::{find_all, find_one, to_document};
use crate::models::Endpoint;
use crate::store::{Collection, DocumentStore, Filter, StoreError};

pub async fn list(
    store: &dyn DocumentStore,
    service_id: Option<&str>,
    module: Option<&str>,
) -> Result<Vec<Endpoint>, StoreError> {
    let mut filter = Filter::new();
    if let Some(service_id) = service_id {
        filter = filter.eq("serviceId", service_id);
    }
    if let Some(module) = module {
        filter = filter.eq("module", module);
    }
    find_all(store, Collection::Endpoints, &filter).await
}

pub async fn find_by_id(
    store: &dyn DocumentStore,
    id: &str,
) -> Result<Option<Endpoint>, StoreError> {
    find_one(store, Collection::Endpoints, &Filter::by_id(id)).await
}

pub async fn insert(store: &dyn DocumentStore, endpoint: &Endpoint) -> Result<(), StoreError> {
    store
        .insert(Collection::Endpoints, to_document(endpoint)?)
        .await
}

pub async fn delete(store: &dyn DocumentStore, id: &str) -> Result<bool, StoreError> {
    let deleted = store
        .delete_many(Collection::Endpoints, &Filter::by_id(id))
        .await?;
    Ok(deleted > 0)
}

/// Bulk rewrite of the denormalized module name.
pub async fn rename_module(
    store: &dyn DocumentStore,
    old_name: &str,
    new_name: &str,
) -> Result<u64, StoreError> {
    let mut set = Map::new();
    set.insert("module".to_string(), Value::from(new_name));
    store
        .update_many(
            Collection::Endpoints,
            &Filter::new().eq("module", old_name),
            set,
        )
        .await
}

pub async fn delete_by_module(store: &dyn DocumentStore, module: &str) -> Result<u64, StoreError> {
    store
        .delete_many(Collection::Endpoints, &Filter::new().eq("module", module))
        .await
}
