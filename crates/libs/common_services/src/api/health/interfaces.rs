use crate::face_client::{FaceModel, FaceServiceHealth};
use app_state::RedactedSettings;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub commit: String,
    /// Whether the database answered a ping.
    pub database: bool,
    pub face: FaceServiceHealth,
    #[schema(value_type = Object)]
    pub config: RedactedSettings,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct LoadModelRequest {
    pub model: FaceModel,
}

#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
pub struct LoadModelResponse {
    pub ok: bool,
    pub message: String,
    pub model: FaceModel,
}
