use serde_json::{Map, Value};

use crate::db::{find_all, find_one, to_document};
use crate::models::Schema;
use crate::store::{Collection, DocumentStore, Filter, StoreError};

pub async fn list(
    store: &dyn DocumentStore,
    service_id: Option<&str>,
    module: Option<&str>,
) -> Result<Vec<Schema>, StoreError> {
    let mut filter = Filter::new();
    if let Some(service_id) = service_id {
        filter = filter.eq("serviceId", service_id);
    }
    if let Some(module) = module {
        filter = filter.eq("module", module);
    }
    find_all(store, Collection::Schemas, &filter).await
}

pub async fn find_by_id(store: &dyn DocumentStore, id: &str) -> Result<Option<Schema>, StoreError> {
    find_one(store, Collection::Schemas, &Filter::by_id(id)).await
}

pub async fn insert(store: &dyn DocumentStore, schema: &Schema) -> Result<(), StoreError> {
    store.insert(Collection::Schemas, to_document(schema)?).await
}

/// Persist the whole document, embedded `fields` included.
pub async fn save(store: &dyn DocumentStore, schema: &Schema) -> Result<bool, StoreError> {
    store
        .replace(Collection::Schemas, &schema.id, to_document(schema)?)
        .await
}

pub async fn delete(store: &dyn DocumentStore, id: &str) -> Result<bool, StoreError> {
    let deleted = store
        .delete_many(Collection::Schemas, &Filter::by_id(id))
        .await?;
    Ok(deleted > 0)
}

pub async fn rename_module(
    store: &dyn DocumentStore,
    old_name: &str,
    new_name: &str,
) -> Result<u64, StoreError> {
    let mut set = Map::new();
    set.insert("module".to_string(), Value::from(new_name));
    store
        .update_many(Collection::Schemas, &Filter::new().eq("module", old_name), set)
        .await
}

pub async fn delete_by_module(store: &dyn DocumentStore, module: &str) -> Result<u64, StoreError> {
    store
        .delete_many(Collection::Schemas, &Filter::new().eq("module", module))
        .await
}
