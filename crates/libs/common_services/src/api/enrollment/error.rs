use crate::database::DbError;
use crate::face_client::FaceClientError;
use crate::image_codec::ImageCodecError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("Capture {index} could not be decoded: {source}")]
    Decode {
        index: usize,
        source: ImageCodecError,
    },

    #[error("{0}")]
    Validation(String),

    #[error("Customer conflicts with an existing record: {0}")]
    Constraint(String),

    #[error("Face service unavailable: {0}")]
    InferenceUnavailable(String),

    #[error("Database error: {0}")]
    Database(DbError),

    #[error("Could not store capture image: {0}")]
    Io(#[from] std::io::Error),
}

impl EnrollmentError {
    /// Stable error code sent to clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "DecodeError",
            Self::Validation(_) => "ValidationError",
            Self::Constraint(_) => "ConstraintError",
            Self::InferenceUnavailable(_) => "ServiceUnavailable",
            Self::Database(_) | Self::Io(_) => "InternalError",
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Decode { .. } | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Constraint(_) => StatusCode::CONFLICT,
            Self::InferenceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a failed embedding call. Anything the service said about the image is a validation
    /// problem; a service that cannot be reached is not the caller's fault.
    #[must_use]
    pub fn from_inference(err: &FaceClientError) -> Self {
        if err.is_unreachable() {
            Self::InferenceUnavailable(err.to_string())
        } else {
            Self::Validation(format!("Failed to extract face - {err}"))
        }
    }
}

impl From<DbError> for EnrollmentError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(constraint) | DbError::ForeignKeyViolation(constraint) => {
                Self::Constraint(constraint)
            }
            other @ DbError::Sqlx(_) => Self::Database(other),
        }
    }
}

impl From<JsonRejection> for EnrollmentError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

fn log_error(error: &EnrollmentError) {
    match error {
        EnrollmentError::Decode { .. }
        | EnrollmentError::Validation(_)
        | EnrollmentError::Constraint(_) => warn!("Enrollment rejected: {}", error),
        EnrollmentError::InferenceUnavailable(_)
        | EnrollmentError::Database(_)
        | EnrollmentError::Io(_) => error!("Enrollment failed: {}", error),
    }
}

impl IntoResponse for EnrollmentError {
    fn into_response(self) -> Response {
        log_error(&self);

        let message = match &self {
            Self::Database(_) => "A database error occurred.".to_string(),
            Self::Io(_) => "An unexpected internal error occurred.".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({ "ok": false, "code": self.code(), "message": message }));
        (self.status(), body).into_response()
    }
}
