use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Models the inference service can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FaceModel {
    BuffaloL,
    BuffaloS,
}

impl fmt::Display for FaceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuffaloL => write!(f, "buffalo_l"),
            Self::BuffaloS => write!(f, "buffalo_s"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaceServiceHealth {
    pub ok: bool,
    pub models_loaded: bool,
    pub model: Option<String>,
    pub commit: String,
}

impl Default for FaceServiceHealth {
    fn default() -> Self {
        Self {
            ok: false,
            models_loaded: false,
            model: None,
            commit: "unknown".to_string(),
        }
    }
}
