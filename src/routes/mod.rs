pub mod endpoints;
pub mod fields;
pub mod modules;
pub mod schemas;
pub mod services;

use axum::extract::FromRequest;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::SharedState;

/// JSON request body whose rejection renders as the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Body shape shared by every response: `{ success, data?, message? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }

    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: Some(message.into()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub service_id: Option<String>,
    pub module: Option<String>,
}

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Services
        .route("/api/v1/services", post(services::create))
        .route(
            "/api/v1/services/{id}",
            delete(services::delete),
        )
        // Modules
        .route(
            "/api/v1/modules",
            get(modules::list).post(modules::create),
        )
        .route(
            "/api/v1/modules/{id}",
            get(modules::get)
                .put(modules::update)
                .delete(modules::delete),
        )
        // Endpoints
        .route(
            "/api/v1/endpoints",
            get(endpoints::list).post(endpoints::create),
        )
        .route(
            "/api/v1/endpoints/{id}",
            get(endpoints::get).delete(endpoints::delete),
        )
        // Schemas
        .route(
            "/api/v1/schemas",
            get(schemas::list).post(schemas::create),
        )
        .route(
            "/api/v1/schemas/{id}",
            get(schemas::get)
                .put(schemas::update)
                .delete(schemas::delete),
        )
        // Fields
        .route("/api/v1/schemas/{schema_id}/fields", post(fields::create))
        .route(
            "/api/v1/schemas/{schema_id}/fields/{field_id}",
            put(fields::update).delete(fields::delete),
        )
}
