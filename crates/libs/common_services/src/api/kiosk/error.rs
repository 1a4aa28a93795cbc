use crate::database::DbError;
use crate::face_client::FaceClientError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum KioskError {
    #[error("{0}")]
    Validation(String),

    #[error("Face service unavailable: {0}")]
    InferenceUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl KioskError {
    #[must_use]
    pub fn from_inference(err: &FaceClientError) -> Self {
        if err.is_unreachable() {
            Self::InferenceUnavailable(err.to_string())
        } else {
            Self::Validation(format!("Failed to extract face - {err}"))
        }
    }
}

impl From<JsonRejection> for KioskError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

fn log_error(error: &KioskError) {
    match error {
        KioskError::Validation(msg) => warn!("Kiosk request rejected: {}", msg),
        KioskError::InferenceUnavailable(msg) => error!("Face service unavailable: {}", msg),
        KioskError::Database(e) => error!("Database query failed: {}", e),
    }
}

impl IntoResponse for KioskError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, code, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "ValidationError", msg.clone()),
            Self::InferenceUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "ServiceUnavailable",
                self.to_string(),
            ),
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                "A database error occurred.".to_string(),
            ),
        };

        let body = Json(json!({ "ok": false, "code": code, "message": message }));
        (status, body).into_response()
    }
}
