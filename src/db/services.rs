use crate::db::{find_one, to_document};
use crate::models::Service;
use crate::store::{Collection, DocumentStore, Filter, StoreError};

pub async fn find_by_id(store: &dyn DocumentStore, id: &str) -> Result<Option<Service>, StoreError> {
    find_one(store, Collection::Services, &Filter::by_id(id)).await
}

pub async fn insert(store: &dyn DocumentStore, service: &Service) -> Result<(), StoreError> {
    store
        .insert(Collection::Services, to_document(service)?)
        .await
}

pub async fn delete(store: &dyn DocumentStore, id: &str) -> Result<bool, StoreError> {
    let deleted = store
        .delete_many(Collection::Services, &Filter::by_id(id))
        .await?;
    Ok(deleted > 0)
}
