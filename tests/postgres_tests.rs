//! Store and cascade behaviour against Postgres. Each test creates its own
//! database from `DATABASE_URL` and is skipped when it is unset.

mod common;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Map, Value, json};

use apicatalog::catalog::{self, ModuleUpdate, NewEndpoint, NewModule, NewSchema, NewService};
use apicatalog::db;
use apicatalog::error::AppError;
use apicatalog::models::{FieldPatch, NewField};
use apicatalog::store::{Collection, Document, DocumentStore, Filter, PgStore, StoreError};

use common::count;

macro_rules! pg_or_skip {
    () => {
        match common::pg_store().await {
            Some(store) => store,
            None => {
                eprintln!("DATABASE_URL not set, skipping");
                return;
            }
        }
    };
}

fn doc(value: Value) -> Document {
    value.as_object().unwrap().clone()
}

/// Service "Payments API" with module "Billing", one endpoint and one
/// schema, created through the catalog. Returns `(service_id, module_id)`.
async fn seed_billing(store: &PgStore) -> (String, String) {
    let service = catalog::create_service(
        store,
        NewService {
            name: "Payments API".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();
    let module = catalog::create_module(
        store,
        NewModule {
            service_id: Some(service.id.clone()),
            name: "Billing".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();
    catalog::create_endpoint(
        store,
        NewEndpoint {
            service_id: Some(service.id.clone()),
            module: "Billing".to_string(),
            method: "get".to_string(),
            path: "/invoices".to_string(),
            summary: None,
            params: None,
            response: None,
        },
    )
    .await
    .unwrap();
    catalog::create_schema(
        store,
        NewSchema {
            service_id: Some(service.id.clone()),
            module: "Billing".to_string(),
            name: "Invoice".to_string(),
            description: None,
            fields: Vec::new(),
        },
    )
    .await
    .unwrap();
    (service.id, module.id)
}

// ── Store ───────────────────────────────────────────────────────

#[tokio::test]
async fn ne_filter_matches_other_values_and_missing_keys() {
    let store = pg_or_skip!();
    for body in [
        json!({ "id": "a", "name": "Billing" }),
        json!({ "id": "b", "name": "Shipping" }),
        json!({ "id": "c" }),
    ] {
        store.insert(Collection::Modules, doc(body)).await.unwrap();
    }

    let ids: Vec<_> = store
        .find(Collection::Modules, &Filter::new().ne("name", "Billing"))
        .await
        .unwrap()
        .into_iter()
        .map(|d| d["id"].clone())
        .collect();
    assert_eq!(ids, [json!("b"), json!("c")]);
}

#[tokio::test]
async fn eq_and_ne_combine_as_conjunction() {
    let store = pg_or_skip!();
    for (id, service_id, name) in [("a", "s1", "x"), ("b", "s1", "y"), ("c", "s2", "y")] {
        store
            .insert(
                Collection::Schemas,
                doc(json!({ "id": id, "serviceId": service_id, "name": name })),
            )
            .await
            .unwrap();
    }

    let found = store
        .find(
            Collection::Schemas,
            &Filter::new().eq("serviceId", "s1").ne("id", "a"),
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], "b");
}

#[tokio::test]
async fn update_many_merges_set_and_keeps_other_keys() {
    let store = pg_or_skip!();
    for (id, module) in [("e1", "Billing"), ("e2", "Billing"), ("e3", "Shipping")] {
        store
            .insert(
                Collection::Endpoints,
                doc(json!({ "id": id, "module": module, "path": format!("/{id}") })),
            )
            .await
            .unwrap();
    }

    let mut set = Map::new();
    set.insert("module".to_string(), json!("Payments"));
    let updated = store
        .update_many(Collection::Endpoints, &Filter::new().eq("module", "Billing"), set)
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let e1 = store
        .find_one(Collection::Endpoints, &Filter::by_id("e1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(e1["module"], "Payments");
    assert_eq!(e1["path"], "/e1");
    assert_eq!(count(&store, Collection::Endpoints, "module", "Shipping").await, 1);
}

#[tokio::test]
async fn find_returns_insertion_order() {
    let store = pg_or_skip!();
    for id in ["c", "a", "b"] {
        store
            .insert(Collection::Schemas, doc(json!({ "id": id, "serviceId": "svc" })))
            .await
            .unwrap();
    }
    let ids: Vec<_> = store
        .find(Collection::Schemas, &Filter::new().eq("serviceId", "svc"))
        .await
        .unwrap()
        .into_iter()
        .map(|d| d["id"].clone())
        .collect();
    assert_eq!(ids, [json!("c"), json!("a"), json!("b")]);
}

#[tokio::test]
async fn replace_and_delete_report_what_they_touched() {
    let store = pg_or_skip!();
    store
        .insert(Collection::Services, doc(json!({ "id": "s1", "name": "A" })))
        .await
        .unwrap();

    assert!(
        store
            .replace(Collection::Services, "s1", doc(json!({ "id": "s1", "name": "B" })))
            .await
            .unwrap()
    );
    assert!(
        !store
            .replace(Collection::Services, "s2", doc(json!({ "id": "s2", "name": "C" })))
            .await
            .unwrap()
    );

    let s1 = store
        .find_one(Collection::Services, &Filter::by_id("s1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(s1["name"], "B");

    let removed = store
        .delete_many(Collection::Services, &Filter::by_id("s1"))
        .await
        .unwrap();
    assert_eq!(removed, 1);
}

#[tokio::test]
async fn duplicate_id_is_rejected() {
    let store = pg_or_skip!();
    store
        .insert(Collection::Endpoints, doc(json!({ "id": "e1" })))
        .await
        .unwrap();
    let err = store
        .insert(Collection::Endpoints, doc(json!({ "id": "e1" })))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));
}

#[tokio::test]
async fn unique_indexes_reject_duplicate_names_as_conflicts() {
    let store = pg_or_skip!();
    store
        .insert(Collection::Services, doc(json!({ "id": "s1", "name": "Payments API" })))
        .await
        .unwrap();
    let err = store
        .insert(Collection::Services, doc(json!({ "id": "s2", "name": "Payments API" })))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));
    assert_eq!(
        AppError::from(err).into_response().status(),
        StatusCode::CONFLICT
    );

    // Schema names are scoped by service.
    store
        .insert(
            Collection::Schemas,
            doc(json!({ "id": "a", "serviceId": "s1", "name": "Invoice" })),
        )
        .await
        .unwrap();
    store
        .insert(
            Collection::Schemas,
            doc(json!({ "id": "b", "serviceId": "s2", "name": "Invoice" })),
        )
        .await
        .unwrap();
    let err = store
        .insert(
            Collection::Schemas,
            doc(json!({ "id": "c", "serviceId": "s1", "name": "Invoice" })),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));
}

// ── Cascades ────────────────────────────────────────────────────

#[tokio::test]
async fn rename_module_propagates_on_postgres() {
    let store = pg_or_skip!();
    let (_, module_id) = seed_billing(&store).await;

    let module = catalog::update_module(
        &store,
        &module_id,
        ModuleUpdate {
            name: Some("Payments".to_string()),
            description: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(module.name, "Payments");

    assert_eq!(count(&store, Collection::Endpoints, "module", "Payments").await, 1);
    assert_eq!(count(&store, Collection::Schemas, "module", "Payments").await, 1);
    assert_eq!(count(&store, Collection::Endpoints, "module", "Billing").await, 0);
    let stored = db::modules::find_by_id(&store, &module_id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Payments");
}

#[tokio::test]
async fn delete_module_and_service_cascade_on_postgres() {
    let store = pg_or_skip!();
    let (service_id, module_id) = seed_billing(&store).await;

    let deleted = catalog::delete_module(&store, &module_id).await.unwrap();
    assert_eq!((deleted.endpoints, deleted.schemas), (1, 1));
    assert!(db::modules::find_by_id(&store, &module_id).await.unwrap().is_none());

    store
        .insert(
            Collection::ErrorCodes,
            doc(json!({ "id": "ec1", "serviceId": service_id, "code": "E1" })),
        )
        .await
        .unwrap();

    let deleted = catalog::delete_service(&store, &service_id).await.unwrap();
    assert_eq!(deleted.error_codes, 1);
    for collection in [
        Collection::Modules,
        Collection::Endpoints,
        Collection::Schemas,
        Collection::ErrorCodes,
        Collection::OverviewCards,
    ] {
        assert_eq!(count(&store, collection, "serviceId", &service_id).await, 0);
    }
    assert!(db::services::find_by_id(&store, &service_id).await.unwrap().is_none());
}

#[tokio::test]
async fn field_lifecycle_on_postgres() {
    let store = pg_or_skip!();
    seed_billing(&store).await;
    let schema_id = db::schemas::list(&store, None, None).await.unwrap()[0].id.clone();

    let field = |name: &str| -> NewField {
        serde_json::from_value(json!({ "name": name, "type": "string", "description": "d" }))
            .unwrap()
    };
    catalog::add_field(&store, &schema_id, field("a")).await.unwrap();
    let schema = catalog::add_field(&store, &schema_id, field("b")).await.unwrap();
    let first = schema.fields[0].id.clone();

    let patch: FieldPatch = serde_json::from_value(json!({ "description": null })).unwrap();
    let schema = catalog::update_field(&store, &schema_id, &first, patch)
        .await
        .unwrap();
    assert_eq!(schema.fields[0].description, None);

    let schema = catalog::remove_field(&store, &schema_id, &first).await.unwrap();
    let stored = db::schemas::find_by_id(&store, &schema_id).await.unwrap().unwrap();
    assert_eq!(stored, schema);
    assert_eq!(stored.fields.len(), 1);
    assert_eq!(stored.fields[0].name, "b");
}
