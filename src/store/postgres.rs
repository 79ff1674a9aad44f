use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{Collection, Condition, Document, DocumentStore, Filter, StoreError, document_id};

/// Documents live in one `documents` table keyed by `(collection, id)` with a
/// JSONB body. Filters compile to JSONB containment.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("migration failed: {e}")))
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    let mut contains = Map::new();
    for condition in filter.conditions() {
        match condition {
            Condition::Eq(key, value) => {
                contains.insert(key.clone(), value.clone());
            }
            Condition::Ne(key, value) => {
                let mut excluded = Map::new();
                excluded.insert(key.clone(), value.clone());
                qb.push(" AND NOT (body @> ")
                    .push_bind(Json(Value::Object(excluded)))
                    .push(")");
            }
        }
    }
    if !contains.is_empty() {
        qb.push(" AND body @> ").push_bind(Json(Value::Object(contains)));
    }
}

fn into_document(body: Json<Value>) -> Result<Document, StoreError> {
    match body.0 {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Corrupt(format!("expected object, found {other}"))),
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT body FROM documents WHERE collection = ");
        qb.push_bind(collection.as_str());
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY seq LIMIT 1");

        qb.build_query_scalar::<Json<Value>>()
            .fetch_optional(&self.pool)
            .await?
            .map(into_document)
            .transpose()
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT body FROM documents WHERE collection = ");
        qb.push_bind(collection.as_str());
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY seq");

        qb.build_query_scalar::<Json<Value>>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(into_document)
            .collect()
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError> {
        let id = document_id(&doc)?.to_string();
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection.as_str())
            .bind(id)
            .bind(Json(Value::Object(doc)))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        doc: Document,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET body = $3, updated_at = now()
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(Value::Object(doc)))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> Result<u64, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE documents SET body = body || ");
        qb.push_bind(Json(Value::Object(set)))
            .push(", updated_at = now() WHERE collection = ")
            .push_bind(collection.as_str());
        push_filter(&mut qb, filter);

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("DELETE FROM documents WHERE collection = ");
        qb.push_bind(collection.as_str());
        push_filter(&mut qb, filter);

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
