use chrono::Utc;
use serde::Deserialize;

use crate::catalog::{require_service_id, uniqueness, validate_field_type, validate_name};
use crate::db;
use crate::error::AppError;
use crate::models::{Endpoint, Module, NewField, Schema, Service};
use crate::store::{Collection, DocumentStore, Filter};

const METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewModule {
    pub service_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEndpoint {
    pub service_id: Option<String>,
    pub module: String,
    pub method: String,
    pub path: String,
    pub summary: Option<String>,
    pub params: Option<serde_json::Value>,
    pub response: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchema {
    pub service_id: Option<String>,
    pub module: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<NewField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub module: Option<String>,
}

pub async fn create_service(
    store: &dyn DocumentStore,
    req: NewService,
) -> Result<Service, AppError> {
    let name = validate_name(&req.name)?;
    uniqueness::ensure_unique(store, Collection::Services, Filter::new(), &name, None).await?;

    let now = Utc::now();
    let service = Service {
        id: db::new_id(),
        name,
        description: req.description,
        created_at: now,
        updated_at: now,
    };
    db::services::insert(store, &service).await?;
    Ok(service)
}

/// Module names are unique across all services: dependents reference them
/// by name alone.
pub async fn create_module(store: &dyn DocumentStore, req: NewModule) -> Result<Module, AppError> {
    let service_id = require_service_id(req.service_id.as_deref())?;
    let name = validate_name(&req.name)?;

    db::services::find_by_id(store, service_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Service does not exist".to_string()))?;
    uniqueness::ensure_unique(store, Collection::Modules, Filter::new(), &name, None).await?;

    let now = Utc::now();
    let module = Module {
        id: db::new_id(),
        service_id: service_id.to_string(),
        name,
        description: req.description,
        created_at: now,
        updated_at: now,
    };
    db::modules::insert(store, &module).await?;
    Ok(module)
}

/// The referenced module must exist in the same service.
async fn resolve_module(
    store: &dyn DocumentStore,
    service_id: &str,
    module: &str,
) -> Result<Module, AppError> {
    db::modules::find_by_name(store, service_id, module.trim())
        .await?
        .ok_or_else(|| {
            AppError::BadRequest(format!("Module '{}' does not exist in this service", module.trim()))
        })
}

pub async fn create_endpoint(
    store: &dyn DocumentStore,
    req: NewEndpoint,
) -> Result<Endpoint, AppError> {
    let service_id = require_service_id(req.service_id.as_deref())?;

    let method = req.method.trim().to_ascii_uppercase();
    if !METHODS.contains(&method.as_str()) {
        return Err(AppError::BadRequest(format!("Unsupported method '{method}'")));
    }
    let path = req.path.trim();
    if !path.starts_with('/') {
        return Err(AppError::BadRequest("Path must start with '/'".to_string()));
    }

    let module = resolve_module(store, service_id, &req.module).await?;

    let now = Utc::now();
    let endpoint = Endpoint {
        id: db::new_id(),
        service_id: service_id.to_string(),
        module: module.name,
        method,
        path: path.to_string(),
        summary: req.summary,
        params: req.params,
        response: req.response,
        created_at: now,
        updated_at: now,
    };
    db::endpoints::insert(store, &endpoint).await?;
    Ok(endpoint)
}

pub async fn delete_endpoint(store: &dyn DocumentStore, endpoint_id: &str) -> Result<(), AppError> {
    if !db::endpoints::delete(store, endpoint_id).await? {
        return Err(AppError::NotFound("Endpoint not found".to_string()));
    }
    Ok(())
}

pub async fn create_schema(store: &dyn DocumentStore, req: NewSchema) -> Result<Schema, AppError> {
    let service_id = require_service_id(req.service_id.as_deref())?;
    let name = validate_name(&req.name)?;
    let module = resolve_module(store, service_id, &req.module).await?;

    uniqueness::ensure_unique(
        store,
        Collection::Schemas,
        Filter::new().eq("serviceId", service_id),
        &name,
        None,
    )
    .await?;

    let fields = req
        .fields
        .into_iter()
        .map(|mut f| {
            f.name = validate_name(&f.name)?;
            f.field_type = validate_field_type(&f.field_type)?;
            Ok::<_, AppError>(f.into_field())
        })
        .collect::<Result<Vec<_>, _>>()?;

    let now = Utc::now();
    let schema = Schema {
        id: db::new_id(),
        service_id: service_id.to_string(),
        module: module.name,
        name,
        description: req.description,
        fields,
        created_at: now,
        updated_at: now,
    };
    db::schemas::insert(store, &schema).await?;
    Ok(schema)
}

/// Update schema metadata. `fields` are managed through the field
/// operations only.
pub async fn update_schema(
    store: &dyn DocumentStore,
    schema_id: &str,
    update: SchemaUpdate,
) -> Result<Schema, AppError> {
    let mut schema = db::schemas::find_by_id(store, schema_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Schema not found".to_string()))?;

    if let Some(name) = update.name {
        let name = validate_name(&name)?;
        if name != schema.name {
            uniqueness::ensure_unique(
                store,
                Collection::Schemas,
                Filter::new().eq("serviceId", schema.service_id.as_str()),
                &name,
                Some(schema.id.as_str()),
            )
            .await?;
            schema.name = name;
        }
    }

    if let Some(module) = update.module {
        schema.module = resolve_module(store, &schema.service_id, &module).await?.name;
    }

    if let Some(description) = update.description {
        schema.description = Some(description);
    }
    schema.updated_at = Utc::now();

    if !db::schemas::save(store, &schema).await? {
        return Err(AppError::NotFound("Schema not found".to_string()));
    }
    Ok(schema)
}

pub async fn delete_schema(store: &dyn DocumentStore, schema_id: &str) -> Result<(), AppError> {
    if !db::schemas::delete(store, schema_id).await? {
        return Err(AppError::NotFound("Schema not found".to_string()));
    }
    Ok(())
}
