use async_trait::async_trait;
use dashmap::DashMap;

use super::{Collection, Document, DocumentStore, Filter, StoreError, document_id};

/// Process-local store. Enforces id uniqueness per collection but no
/// secondary unique constraints, so concurrent check-then-write races are
/// observable here.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<Collection, Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .get(&collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError> {
        let id = document_id(&doc)?.to_string();
        let mut docs = self.collections.entry(collection).or_default();
        if docs.iter().any(|d| d.get("id").and_then(|v| v.as_str()) == Some(id.as_str())) {
            return Err(StoreError::Duplicate(format!("{collection}/{id} already exists")));
        }
        docs.push(doc);
        Ok(())
    }

    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        doc: Document,
    ) -> Result<bool, StoreError> {
        let Some(mut docs) = self.collections.get_mut(&collection) else {
            return Ok(false);
        };
        let filter = Filter::by_id(id);
        match docs.iter_mut().find(|d| filter.matches(d)) {
            Some(existing) => {
                *existing = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> Result<u64, StoreError> {
        let Some(mut docs) = self.collections.get_mut(&collection) else {
            return Ok(0);
        };
        let mut updated = 0;
        for doc in docs.iter_mut().filter(|d| filter.matches(d)) {
            for (key, value) in &set {
                doc.insert(key.clone(), value.clone());
            }
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        let Some(mut docs) = self.collections.get_mut(&collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        Ok((before - docs.len()) as u64)
    }
}
