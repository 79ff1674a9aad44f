use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::catalog;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{FieldPatch, NewField, Schema};
use crate::routes::{ApiJson, ApiResponse};
use crate::state::SharedState;

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(schema_id): Path<String>,
    ApiJson(req): ApiJson<NewField>,
) -> Result<(StatusCode, Json<ApiResponse<Schema>>), AppError> {
    auth.require_admin()?;

    let schema = catalog::add_field(state.store.as_ref(), &schema_id, req).await?;
    let field_id = schema.fields.last().map(|f| f.id.clone());

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "field.created",
        "schema",
        Some(&schema.id),
        Some(json!({ "fieldId": field_id })),
    )
    .await;

    Ok((StatusCode::CREATED, ApiResponse::data(schema)))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((schema_id, field_id)): Path<(String, String)>,
    ApiJson(req): ApiJson<FieldPatch>,
) -> Result<Json<ApiResponse<Schema>>, AppError> {
    auth.require_admin()?;

    let schema = catalog::update_field(state.store.as_ref(), &schema_id, &field_id, req).await?;

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "field.updated",
        "schema",
        Some(&schema.id),
        Some(json!({ "fieldId": field_id })),
    )
    .await;

    Ok(ApiResponse::data(schema))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((schema_id, field_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Schema>>, AppError> {
    auth.require_admin()?;

    let schema = catalog::remove_field(state.store.as_ref(), &schema_id, &field_id).await?;

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "field.deleted",
        "schema",
        Some(&schema.id),
        Some(json!({ "fieldId": field_id })),
    )
    .await;

    Ok(ApiResponse::data(schema))
}
