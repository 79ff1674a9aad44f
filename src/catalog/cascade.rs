use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::catalog::{uniqueness, validate_name};
use crate::db;
use crate::error::AppError;
use crate::models::{Module, Service};
use crate::store::{Collection, DocumentStore, Filter, StoreError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDeletion {
    pub module: Module,
    pub endpoints: u64,
    pub schemas: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDeletion {
    pub service: Service,
    pub modules: u64,
    pub endpoints: u64,
    pub schemas: u64,
    pub error_codes: u64,
    pub overview_cards: u64,
}

/// Update a module, renaming every endpoint and schema that references it
/// when the name changes.
///
/// Dependents are rewritten before the module itself, so an interrupted
/// rename leaves them pointing at the old name, which still exists.
/// Repeating the call completes it.
///
/// A unique-constraint rejection of the final module write is not a
/// `Conflict`: dependents have already moved, so it surfaces as an
/// internal error.
pub async fn update_module(
    store: &dyn DocumentStore,
    module_id: &str,
    update: ModuleUpdate,
) -> Result<Module, AppError> {
    let mut module = db::modules::find_by_id(store, module_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Module not found".to_string()))?;

    let mut renamed = false;
    if let Some(name) = update.name {
        let new_name = validate_name(&name)?;
        if new_name != module.name {
            uniqueness::ensure_unique(
                store,
                Collection::Modules,
                Filter::new(),
                &new_name,
                Some(module.id.as_str()),
            )
            .await?;

            let old_name = module.name.clone();
            let endpoints = db::endpoints::rename_module(store, &old_name, &new_name)
                .await
                .inspect_err(|e| {
                    tracing::warn!(module_id, "Rename aborted while updating endpoints: {e}")
                })?;
            tracing::debug!(module_id, endpoints, "Endpoints moved to '{new_name}'");

            let schemas = db::schemas::rename_module(store, &old_name, &new_name)
                .await
                .inspect_err(|e| {
                    tracing::warn!(module_id, "Rename aborted while updating schemas: {e}")
                })?;
            tracing::debug!(module_id, schemas, "Schemas moved to '{new_name}'");

            tracing::info!(
                module_id,
                endpoints,
                schemas,
                "Dependents moved '{old_name}' -> '{new_name}'"
            );
            module.name = new_name;
            renamed = true;
        }
    }

    if let Some(description) = update.description {
        module.description = Some(description);
    }
    module.updated_at = Utc::now();

    let saved = db::modules::save(store, &module).await.map_err(|e| {
        if !renamed {
            return AppError::from(e);
        }
        tracing::warn!(module_id, "Rename aborted at module record: {e}");
        match e {
            StoreError::Duplicate(msg) => AppError::Internal(format!(
                "module '{}' rejected after dependents were renamed: {msg}",
                module.name
            )),
            other => AppError::from(other),
        }
    })?;
    if !saved {
        // Removed by a concurrent delete after it was loaded.
        return Err(AppError::NotFound("Module not found".to_string()));
    }
    Ok(module)
}

/// Delete a module together with the endpoints and schemas filed under its
/// name. The module record goes last.
pub async fn delete_module(
    store: &dyn DocumentStore,
    module_id: &str,
) -> Result<ModuleDeletion, AppError> {
    let module = db::modules::find_by_id(store, module_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Module not found".to_string()))?;

    let endpoints = db::endpoints::delete_by_module(store, &module.name)
        .await
        .inspect_err(|e| tracing::warn!(module_id, "Delete aborted at endpoints: {e}"))?;
    tracing::debug!(module_id, endpoints, "Endpoints removed");

    let schemas = db::schemas::delete_by_module(store, &module.name)
        .await
        .inspect_err(|e| tracing::warn!(module_id, "Delete aborted at schemas: {e}"))?;
    tracing::debug!(module_id, schemas, "Schemas removed");

    db::modules::delete(store, &module.id)
        .await
        .inspect_err(|e| tracing::warn!(module_id, "Delete aborted at module record: {e}"))?;

    tracing::info!(module_id, endpoints, schemas, "Module '{}' deleted", module.name);

    Ok(ModuleDeletion {
        module,
        endpoints,
        schemas,
    })
}

/// Delete a service and everything scoped to it. The service record goes
/// last; the dependent collections are independent of each other here.
pub async fn delete_service(
    store: &dyn DocumentStore,
    service_id: &str,
) -> Result<ServiceDeletion, AppError> {
    let service = db::services::find_by_id(store, service_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    let mut counts = [0u64; 5];
    let dependents = [
        Collection::Modules,
        Collection::Endpoints,
        Collection::Schemas,
        Collection::ErrorCodes,
        Collection::OverviewCards,
    ];
    for (count, collection) in counts.iter_mut().zip(dependents) {
        *count = db::delete_by_service(store, collection, service_id)
            .await
            .inspect_err(|e| tracing::warn!(service_id, "Delete aborted at {collection}: {e}"))?;
        tracing::debug!(service_id, removed = *count, "Cleared {collection}");
    }

    db::services::delete(store, &service.id)
        .await
        .inspect_err(|e| tracing::warn!(service_id, "Delete aborted at service record: {e}"))?;

    let [modules, endpoints, schemas, error_codes, overview_cards] = counts;
    tracing::info!(
        service_id,
        modules,
        endpoints,
        schemas,
        error_codes,
        overview_cards,
        "Service '{}' deleted",
        service.name
    );

    Ok(ServiceDeletion {
        service,
        modules,
        endpoints,
        schemas,
        error_codes,
        overview_cards,
    })
}
