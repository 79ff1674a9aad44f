pub mod audit;
pub mod endpoints;
pub mod modules;
pub mod schemas;
pub mod services;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::store::{Collection, Document, DocumentStore, Filter, StoreError};

pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

pub(crate) fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Corrupt(format!("expected object, found {other}"))),
    }
}

pub(crate) fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

pub(crate) async fn find_one<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    filter: &Filter,
) -> Result<Option<T>, StoreError> {
    store
        .find_one(collection, filter)
        .await?
        .map(from_document::<T>)
        .transpose()
}

pub(crate) async fn find_all<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    filter: &Filter,
) -> Result<Vec<T>, StoreError> {
    store
        .find(collection, filter)
        .await?
        .into_iter()
        .map(from_document::<T>)
        .collect()
}

/// Remove every document in `collection` owned by the service.
pub async fn delete_by_service(
    store: &dyn DocumentStore,
    collection: Collection,
    service_id: &str,
) -> Result<u64, StoreError> {
    store
        .delete_many(collection, &Filter::new().eq("serviceId", service_id))
        .await
}
