use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::catalog::{self, NewService};
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::Service;
use crate::routes::{ApiJson, ApiResponse};
use crate::state::SharedState;

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<NewService>,
) -> Result<(StatusCode, Json<ApiResponse<Service>>), AppError> {
    auth.require_admin()?;

    let service = catalog::create_service(state.store.as_ref(), req).await?;

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "service.created",
        "service",
        Some(&service.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, ApiResponse::data(service)))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    auth.require_admin()?;

    let deletion = catalog::delete_service(state.store.as_ref(), &id).await?;

    audit::log_event(
        state.store.as_ref(),
        Some(&auth.actor()),
        "service.deleted",
        "service",
        Some(&id),
        Some(json!({
            "name": deletion.service.name,
            "modules": deletion.modules,
            "endpoints": deletion.endpoints,
            "schemas": deletion.schemas,
            "errorCodes": deletion.error_codes,
            "overviewCards": deletion.overview_cards,
        })),
    )
    .await;

    Ok(ApiResponse::message(format!(
        "Service '{}' and all related data deleted",
        deletion.service.name
    )))
}
