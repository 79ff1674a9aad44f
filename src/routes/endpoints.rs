use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use crate::auth::extractor::AuthUser;
use crate::catalog::{self, NewEndpoint};
use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::Endpoint;
use crate::routes::{ApiJson, ApiResponse, ListQuery};
use crate::state::SharedState;

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Endpoint>>>, AppError> {
    let endpoints = db::endpoints::list(
        state.store.as_ref(),
        query.service_id.as_deref(),
        query.module.as_deref(),
    )
    .await?;
    Ok(ApiResponse::data(endpoints))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<NewEndpoint>,
) -> Result<(StatusCode, Json<ApiResponse<Endpoint>>), AppError> {
    auth.require_admin()?;

    let endpoint = catalog::create_endpoint(state.store.as_ref(), req).await?;

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "endpoint.created",
        "endpoint",
        Some(&endpoint.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, ApiResponse::data(endpoint)))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Endpoint>>, AppError> {
    let endpoint = db::endpoints::find_by_id(state.store.as_ref(), &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Endpoint not found".to_string()))?;
    Ok(ApiResponse::data(endpoint))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    auth.require_admin()?;

    catalog::delete_endpoint(state.store.as_ref(), &id).await?;

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "endpoint.deleted",
        "endpoint",
        Some(&id),
        None,
    )
    .await;

    Ok(ApiResponse::message("Endpoint deleted"))
}
