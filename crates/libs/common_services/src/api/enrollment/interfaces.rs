use app_state::AppSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Request Payloads ---

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EnrollCustomerRequest {
    pub name: String,
    pub pin: String,
    pub captures: Vec<CaptureInput>,
}

/// One face capture, either a bare base64 / data URL string or an object with a capture time.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(untagged)]
pub enum CaptureInput {
    Detailed {
        image: String,
        /// Capture time in milliseconds since the epoch.
        timestamp: Option<i64>,
    },
    Image(String),
}

impl CaptureInput {
    #[must_use]
    pub fn image(&self) -> &str {
        match self {
            Self::Detailed { image, .. } | Self::Image(image) => image,
        }
    }

    #[must_use]
    pub const fn timestamp(&self) -> Option<i64> {
        match self {
            Self::Detailed { timestamp, .. } => *timestamp,
            Self::Image(_) => None,
        }
    }
}

// --- Response Payloads ---

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EnrollResponse {
    pub ok: bool,
    pub customer_id: Uuid,
    pub face_count: usize,
    pub image_paths: Vec<String>,
}

// --- Service configuration ---

/// What the enrollment pipeline needs from the application settings.
#[derive(Debug, Clone)]
pub struct EnrollmentOptions {
    pub images_dir: PathBuf,
    pub embedding_dimension: usize,
    pub max_captures: usize,
}

impl From<&AppSettings> for EnrollmentOptions {
    fn from(settings: &AppSettings) -> Self {
        Self {
            images_dir: settings.storage.images_dir.clone(),
            embedding_dimension: settings.face_service.embedding_dimension,
            max_captures: settings.enrollment.max_captures,
        }
    }
}
