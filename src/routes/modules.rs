use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::catalog::{self, ModuleUpdate, NewModule};
use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::Module;
use crate::routes::{ApiJson, ApiResponse, ListQuery};
use crate::state::SharedState;

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Module>>>, AppError> {
    let modules = db::modules::list(state.store.as_ref(), query.service_id.as_deref()).await?;
    Ok(ApiResponse::data(modules))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<NewModule>,
) -> Result<(StatusCode, Json<ApiResponse<Module>>), AppError> {
    auth.require_admin()?;

    let module = catalog::create_module(state.store.as_ref(), req).await?;

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "module.created",
        "module",
        Some(&module.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, ApiResponse::data(module)))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Module>>, AppError> {
    let module = db::modules::find_by_id(state.store.as_ref(), &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Module not found".to_string()))?;
    Ok(ApiResponse::data(module))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ModuleUpdate>,
) -> Result<Json<ApiResponse<Module>>, AppError> {
    auth.require_admin()?;

    let requested_name = req.name.clone();
    let module = catalog::update_module(state.store.as_ref(), &id, req).await?;

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "module.updated",
        "module",
        Some(&module.id),
        requested_name.map(|name| json!({ "name": name })),
    )
    .await;

    Ok(ApiResponse::data(module))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    auth.require_admin()?;

    let deletion = catalog::delete_module(state.store.as_ref(), &id).await?;

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "module.deleted",
        "module",
        Some(&id),
        Some(json!({
            "name": deletion.module.name,
            "endpoints": deletion.endpoints,
            "schemas": deletion.schemas,
        })),
    )
    .await;

    Ok(ApiResponse::message(format!(
        "Module '{}' and its endpoints and schemas deleted",
        deletion.module.name
    )))
}
