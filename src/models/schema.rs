use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub id: String,
    pub service_id: String,
    /// Denormalized copy of the owning Module's name.
    pub module: String,
    pub name: String,
    pub description: Option<String>,
    /// Display order is insertion order.
    #[serde(default)]
    pub fields: Vec<Field>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Embedded in `Schema::fields`; has no storage identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    pub constraints: Option<serde_json::Value>,
    pub description: Option<String>,
}

/// Field payload on create. Carries no id; one is always assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct NewField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    pub constraints: Option<serde_json::Value>,
    pub description: Option<String>,
}

/// Shallow patch: only supplied keys change. For the optional attributes an
/// explicit `null` clears the value (`Some(None)`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub required: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub constraints: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

/// Only runs when the key is present, so a `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl NewField {
    pub fn into_field(self) -> Field {
        Field {
            id: Uuid::now_v7().to_string(),
            name: self.name,
            field_type: self.field_type,
            required: self.required,
            constraints: self.constraints,
            description: self.description,
        }
    }
}

impl Field {
    pub fn apply(&mut self, patch: FieldPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(field_type) = patch.field_type {
            self.field_type = field_type;
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(constraints) = patch.constraints {
            self.constraints = constraints;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}
