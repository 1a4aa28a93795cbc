use crate::face_client::FaceClientError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("{0}")]
    Validation(String),

    #[error("Could not load model: {0}")]
    LoadModel(#[from] FaceClientError),
}

impl From<JsonRejection> for HealthError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for HealthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "ValidationError"),
            Self::LoadModel(e) if e.is_unreachable() => {
                (StatusCode::SERVICE_UNAVAILABLE, "ServiceUnavailable")
            }
            Self::LoadModel(_) => (StatusCode::BAD_GATEWAY, "UpstreamError"),
        };

        if status.is_client_error() {
            warn!("{}", self);
        } else {
            error!("{}", self);
        }

        let body = Json(json!({ "ok": false, "code": code, "message": self.to_string() }));
        (status, body).into_response()
    }
}
