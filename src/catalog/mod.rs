//! Catalog core: name-uniqueness checks, cascading maintenance of the
//! denormalized module-name references, and the embedded field lifecycle.
//!
//! Multi-step operations run as a fixed sequence of store calls with no
//! rollback. A failure part-way through aborts the remaining steps and leaves
//! the completed ones in place.

pub mod cascade;
pub mod fields;
pub mod records;
pub mod uniqueness;

pub use cascade::{
    ModuleDeletion, ModuleUpdate, ServiceDeletion, delete_module, delete_service, update_module,
};
pub use fields::{add_field, remove_field, update_field};
pub use records::{
    NewEndpoint, NewModule, NewSchema, NewService, SchemaUpdate, create_endpoint, create_module,
    create_schema, create_service, delete_endpoint, delete_schema, update_schema,
};
pub use uniqueness::ensure_unique;

use crate::error::AppError;

const MAX_NAME_LEN: usize = 200;

/// Trim and bound a display name.
pub(crate) fn validate_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Name must be between 1 and {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

pub(crate) fn validate_field_type(field_type: &str) -> Result<String, AppError> {
    let field_type = field_type.trim();
    if field_type.is_empty() {
        return Err(AppError::BadRequest("Field type is required".to_string()));
    }
    Ok(field_type.to_string())
}

pub(crate) fn require_service_id(service_id: Option<&str>) -> Result<&str, AppError> {
    match service_id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(AppError::BadRequest("serviceId is required".to_string())),
    }
}
