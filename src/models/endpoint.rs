use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: String,
    pub service_id: String,
    /// Denormalized copy of the owning Module's name.
    pub module: String,
    pub method: String,
    pub path: String,
    pub summary: Option<String>,
    pub params: Option<serde_json::Value>,
    pub response: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
