use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ItemKind {
    /// Literal text snippet
    Text,
    /// Reference to a file stored by the upload handler
    File,
}

/// One clipboard entry. Never updated in place: items are created by an
/// append, then removed by an owner clear or by expiry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: String,
    pub owner_id: String,
    pub kind: ItemKind,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(owner_id: String, kind: ItemKind, payload: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            kind,
            payload,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AppendTextRequest {
    /// Text to store; must be non-empty after trimming
    #[schema(example = "meeting notes: 14:00 thursday")]
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AppendFileRequest {
    /// Name of a file already stored under the owner's upload directory
    #[schema(example = "doc.pdf")]
    pub filename: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppendResponse {
    /// Unique item identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: String,

    /// When the item was stored
    pub created_at: DateTime<Utc>,

    /// When the item will be automatically deleted
    pub expires_at: DateTime<Utc>,
}

/// One item as the client sees it: text items carry `content`, file items
/// carry a `filename` path relative to the uploads root.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageView {
    pub kind: ItemKind,
    pub content: Option<String>,
    #[schema(example = "alice/doc.pdf")]
    pub filename: Option<String>,
    /// Unix seconds
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearResponse {
    /// Number of items removed
    pub cleared: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Retention window in hours
    pub retention_hours: i64,
}
