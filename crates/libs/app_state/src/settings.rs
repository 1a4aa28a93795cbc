use crate::{
    ApiSettings, DatabaseSettings, EnrollmentSettings, FaceServiceSettings, LoggingSettings,
    MaintenanceSettings, RawSettings, SecretSettings, to_posix_string,
};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf, absolute};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    pub secrets: SecretSettings,
    pub face_service: FaceServiceSettings,
    pub enrollment: EnrollmentSettings,
    pub maintenance: MaintenanceSettings,
    pub database: DatabaseSettings,
}

/// Storage settings with the images root resolved to an absolute path.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub images_dir: PathBuf,
}

impl TryFrom<RawSettings> for AppSettings {
    type Error = color_eyre::Report;

    fn try_from(raw: RawSettings) -> Result<Self> {
        let storage = StorageSettings {
            images_dir: absolute(&raw.storage.images_dir)?,
        };

        Ok(Self {
            storage,
            logging: raw.logging,
            api: raw.api,
            secrets: raw.secrets,
            face_service: raw.face_service,
            enrollment: raw.enrollment,
            maintenance: raw.maintenance,
            database: raw.database,
        })
    }
}

impl FaceServiceSettings {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl MaintenanceSettings {
    #[must_use]
    pub const fn orphan_grace(&self) -> Duration {
        Duration::from_secs(self.orphan_grace_minutes * 60)
    }
}

/// Settings that are safe to expose on the health endpoint.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RedactedSettings {
    pub face_service_url: String,
    pub port: u32,
    pub images_dir: String,
    pub allowed_origins: Vec<String>,
    pub database_url: &'static str,
}

impl AppSettings {
    #[must_use]
    pub fn redacted(&self) -> RedactedSettings {
        RedactedSettings {
            face_service_url: self.face_service.url.clone(),
            port: self.api.port,
            images_dir: to_posix_string(&self.storage.images_dir),
            allowed_origins: self.api.allowed_origins.clone(),
            database_url: "[REDACTED]",
        }
    }

    /// The images root, for callers that only need a path.
    #[must_use]
    pub fn images_dir(&self) -> &Path {
        &self.storage.images_dir
    }
}
