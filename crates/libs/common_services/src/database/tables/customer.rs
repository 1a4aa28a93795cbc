use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Corresponds to the 'customers' table.
#[derive(Debug, Serialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    pub pin: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Corresponds to the 'customer_faces' table.
#[derive(Debug, FromRow, Clone)]
pub struct CustomerFace {
    pub id: i64,
    pub customer_id: Uuid,
    pub face_embedding: Vector,
    /// File name relative to the images root.
    pub image_path: String,
    pub capture_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub pin: String,
}

#[derive(Debug, Clone)]
pub struct NewFaceCapture {
    pub customer_id: Uuid,
    pub embedding: Vec<f32>,
    pub image_path: String,
    pub capture_index: i32,
}

/// A customer as listed on the read path, without PIN or embeddings.
#[derive(Debug, Serialize, FromRow, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: Uuid,
    pub name: String,
    pub face_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A stored face joined with its owner, used for kiosk matching.
#[derive(Debug, FromRow, Clone)]
pub struct PinFace {
    pub customer_id: Uuid,
    pub name: String,
    pub image_path: String,
    pub face_embedding: Vector,
}
