#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use reqwest::{Client, StatusCode};
use sqlx::postgres::PgPoolOptions;
use serde_json::{Value, json};
use uuid::Uuid;

use apicatalog::auth::jwt::{self, Claims};
use apicatalog::config::Config;
use apicatalog::store::{
    Collection, Document, DocumentStore, Filter, MemoryStore, PgStore, StoreError,
};

pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";

/// A running test server backed by an in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub store: Arc<MemoryStore>,
    pub client: Client,
    pub admin_token: String,
    pub viewer_token: String,
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        jwt_secret: JWT_SECRET.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        admin_role: "admin".to_string(),
        max_body_size: 1_048_576,
        log_level: "warn".to_string(),
    }
}

pub fn token(role: &str) -> String {
    let claims = Claims::new(Uuid::now_v7(), role, Duration::minutes(15));
    jwt::encode_token(&claims, JWT_SECRET).unwrap()
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Create a service as admin, return its `data` JSON.
    pub async fn create_service(&self, name: &str) -> Value {
        let (body, status) = self
            .post_auth("/api/v1/services", &self.admin_token, &json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create service failed: {body}");
        body["data"].clone()
    }

    pub async fn create_module(&self, service_id: &str, name: &str) -> Value {
        let (body, status) = self
            .post_auth(
                "/api/v1/modules",
                &self.admin_token,
                &json!({ "serviceId": service_id, "name": name }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create module failed: {body}");
        body["data"].clone()
    }

    pub async fn create_endpoint(&self, service_id: &str, module: &str, path: &str) -> Value {
        let (body, status) = self
            .post_auth(
                "/api/v1/endpoints",
                &self.admin_token,
                &json!({ "serviceId": service_id, "module": module, "method": "get", "path": path }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create endpoint failed: {body}");
        body["data"].clone()
    }

    pub async fn create_schema(&self, service_id: &str, module: &str, name: &str) -> Value {
        let (body, status) = self
            .post_auth(
                "/api/v1/schemas",
                &self.admin_token,
                &json!({ "serviceId": service_id, "module": module, "name": name }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create schema failed: {body}");
        body["data"].clone()
    }
}

pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    spawn_app_with(store.clone(), store).await
}

/// Serve `served`, keeping `store` for direct inspection. They differ when
/// a wrapper such as [`FlakyStore`] sits in front of the memory store.
pub async fn spawn_app_with(store: Arc<MemoryStore>, served: Arc<dyn DocumentStore>) -> TestApp {
    let app = apicatalog::build_app(served, test_config());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        store,
        client: Client::new(),
        admin_token: token("admin"),
        viewer_token: token("viewer"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Replace,
    UpdateMany,
    DeleteMany,
}

/// Which error an injected failure returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fault {
    Unavailable,
    /// What a storage-level unique index reports.
    Duplicate,
}

/// Delegates to a memory store but fails one operation on one collection.
pub struct FlakyStore {
    pub inner: Arc<MemoryStore>,
    pub fail_op: Op,
    pub fail_collection: Collection,
    pub fault: Fault,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>, fail_op: Op, fail_collection: Collection) -> Self {
        Self::with_fault(inner, fail_op, fail_collection, Fault::Unavailable)
    }

    pub fn with_fault(
        inner: Arc<MemoryStore>,
        fail_op: Op,
        fail_collection: Collection,
        fault: Fault,
    ) -> Self {
        Self {
            inner,
            fail_op,
            fail_collection,
            fault,
        }
    }

    fn check(&self, op: Op, collection: Collection) -> Result<(), StoreError> {
        if op != self.fail_op || collection != self.fail_collection {
            return Ok(());
        }
        Err(match self.fault {
            Fault::Unavailable => {
                StoreError::Unavailable(format!("injected failure on {collection}"))
            }
            Fault::Duplicate => StoreError::Duplicate(format!(
                "duplicate key value violates unique constraint on {collection}"
            )),
        })
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.inner.find_one(collection, filter).await
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.find(collection, filter).await
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError> {
        self.inner.insert(collection, doc).await
    }

    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        doc: Document,
    ) -> Result<bool, StoreError> {
        self.check(Op::Replace, collection)?;
        self.inner.replace(collection, id, doc).await
    }

    async fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
    ) -> Result<u64, StoreError> {
        self.check(Op::UpdateMany, collection)?;
        self.inner.update_many(collection, filter, set).await
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        self.check(Op::DeleteMany, collection)?;
        self.inner.delete_many(collection, filter).await
    }
}

/// Count documents in `collection` whose `key` equals `value`.
pub async fn count(store: &dyn DocumentStore, collection: Collection, key: &str, value: &str) -> usize {
    store
        .find(collection, &Filter::new().eq(key, value))
        .await
        .unwrap()
        .len()
}

/// A `PgStore` on a fresh, migrated database created next to `DATABASE_URL`.
/// Returns `None` when `DATABASE_URL` is not set.
pub async fn pg_store() -> Option<PgStore> {
    let _ = dotenvy::dotenv();
    let base_url = std::env::var("DATABASE_URL").ok()?;

    let db_name = format!("apicatalog_test_{}", Uuid::now_v7().simple());

    // Connect to the default postgres DB to create the test DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    let store = PgStore::new(pool);
    store
        .migrate()
        .await
        .expect("Failed to run migrations on test database");
    Some(store)
}
