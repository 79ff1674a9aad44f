pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A stored record. Always a JSON object carrying a string `id` key.
pub type Document = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Services,
    Modules,
    Endpoints,
    Schemas,
    ErrorCodes,
    OverviewCards,
    AuditEvents,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Services => "services",
            Collection::Modules => "modules",
            Collection::Endpoints => "endpoints",
            Collection::Schemas => "schemas",
            Collection::ErrorCodes => "error_codes",
            Collection::OverviewCards => "overview_cards",
            Collection::AuditEvents => "audit_events",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    Ne(String, Value),
}

/// Conjunction of top-level key conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self::new().eq("id", id)
    }

    pub fn eq(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(key.to_string(), value.into()));
        self
    }

    /// Matches documents where `key` differs from `value` or is absent.
    pub fn ne(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Ne(key.to_string(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| match c {
            Condition::Eq(key, value) => doc.get(key) == Some(value),
            Condition::Ne(key, value) => doc.get(key) != Some(value),
        })
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// A storage-level unique constraint rejected the write.
    Duplicate(String),
    Corrupt(String),
    Unavailable(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Duplicate(msg) => write!(f, "Duplicate: {msg}"),
            StoreError::Corrupt(msg) => write!(f, "Corrupt document: {msg}"),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
            StoreError::Database(err) => write!(f, "Database error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Duplicate(db_err.message().to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

/// Generic document store client. No cross-collection transactions are
/// assumed; a single document write is atomic, a bulk write is not atomic
/// across the documents it touches.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError>;

    async fn find(&self, collection: Collection, filter: &Filter)
    -> Result<Vec<Document>, StoreError>;

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError>;

    /// Overwrite the whole document. Returns `false` when no document has `id`.
    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        doc: Document,
    ) -> Result<bool, StoreError>;

    /// Shallow-merge `set` into every matching document.
    async fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> Result<u64, StoreError>;

    async fn delete_many(&self, collection: Collection, filter: &Filter)
    -> Result<u64, StoreError>;
}

pub(crate) fn document_id(doc: &Document) -> Result<&str, StoreError> {
    doc.get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Corrupt("document has no string id".to_string()))
}
