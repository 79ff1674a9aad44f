//! Field lifecycle inside a schema document.
//!
//! Fields have no storage identity of their own: every operation loads the
//! whole schema, edits `fields` in memory by field id and writes the whole
//! schema back. Array position is display order only.

use chrono::Utc;

use crate::catalog::{validate_field_type, validate_name};
use crate::db;
use crate::error::AppError;
use crate::models::{FieldPatch, NewField, Schema};
use crate::store::DocumentStore;

async fn load(store: &dyn DocumentStore, schema_id: &str) -> Result<Schema, AppError> {
    db::schemas::find_by_id(store, schema_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Schema not found".to_string()))
}

async fn persist(store: &dyn DocumentStore, mut schema: Schema) -> Result<Schema, AppError> {
    schema.updated_at = Utc::now();
    if !db::schemas::save(store, &schema).await? {
        return Err(AppError::NotFound("Schema not found".to_string()));
    }
    Ok(schema)
}

fn field_not_found() -> AppError {
    AppError::NotFound("Field not found".to_string())
}

/// Append a field with a freshly assigned id.
pub async fn add_field(
    store: &dyn DocumentStore,
    schema_id: &str,
    mut field: NewField,
) -> Result<Schema, AppError> {
    field.name = validate_name(&field.name)?;
    field.field_type = validate_field_type(&field.field_type)?;

    let mut schema = load(store, schema_id).await?;
    let field = field.into_field();
    tracing::debug!(schema_id, field_id = %field.id, "Adding field '{}'", field.name);
    schema.fields.push(field);
    persist(store, schema).await
}

pub async fn update_field(
    store: &dyn DocumentStore,
    schema_id: &str,
    field_id: &str,
    mut patch: FieldPatch,
) -> Result<Schema, AppError> {
    if let Some(name) = patch.name.as_deref() {
        patch.name = Some(validate_name(name)?);
    }
    if let Some(field_type) = patch.field_type.as_deref() {
        patch.field_type = Some(validate_field_type(field_type)?);
    }

    let mut schema = load(store, schema_id).await?;
    let field = schema
        .fields
        .iter_mut()
        .find(|f| f.id == field_id)
        .ok_or_else(field_not_found)?;
    field.apply(patch);
    persist(store, schema).await
}

/// Remove exactly one field. An unknown field id writes nothing.
pub async fn remove_field(
    store: &dyn DocumentStore,
    schema_id: &str,
    field_id: &str,
) -> Result<Schema, AppError> {
    let mut schema = load(store, schema_id).await?;
    let position = schema
        .fields
        .iter()
        .position(|f| f.id == field_id)
        .ok_or_else(field_not_found)?;
    schema.fields.remove(position);
    persist(store, schema).await
}
