use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use crate::auth::extractor::AuthUser;
use crate::catalog::{self, NewSchema, SchemaUpdate};
use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::Schema;
use crate::routes::{ApiJson, ApiResponse, ListQuery};
use crate::state::SharedState;

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Schema>>>, AppError> {
    let schemas = db::schemas::list(
        state.store.as_ref(),
        query.service_id.as_deref(),
        query.module.as_deref(),
    )
    .await?;
    Ok(ApiResponse::data(schemas))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<NewSchema>,
) -> Result<(StatusCode, Json<ApiResponse<Schema>>), AppError> {
    auth.require_admin()?;

    let schema = catalog::create_schema(state.store.as_ref(), req).await?;

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "schema.created",
        "schema",
        Some(&schema.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, ApiResponse::data(schema)))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Schema>>, AppError> {
    let schema = db::schemas::find_by_id(state.store.as_ref(), &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Schema not found".to_string()))?;
    Ok(ApiResponse::data(schema))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<SchemaUpdate>,
) -> Result<Json<ApiResponse<Schema>>, AppError> {
    auth.require_admin()?;

    let schema = catalog::update_schema(state.store.as_ref(), &id, req).await?;

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "schema.updated",
        "schema",
        Some(&schema.id),
        None,
    )
    .await;

    Ok(ApiResponse::data(schema))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    auth.require_admin()?;

    catalog::delete_schema(state.store.as_ref(), &id).await?;

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "schema.deleted",
        "schema",
        Some(&id),
        None,
    )
    .await;

    Ok(ApiResponse::message("Schema deleted"))
}
