use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub storage: RawStorageSettings,
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    pub secrets: SecretSettings,
    pub face_service: FaceServiceSettings,
    pub enrollment: EnrollmentSettings,
    pub maintenance: MaintenanceSettings,
    pub database: DatabaseSettings,
}

/// Where captured face images are written.
#[derive(Debug, Deserialize, Clone)]
pub struct RawStorageSettings {
    /// Folder for customer face captures, relative paths resolve against the working directory.
    pub images_dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

/// Configuration for the API server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u32,
    pub allowed_origins: Vec<String>,
    pub public_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretSettings {
    pub database_url: String,
}

/// The external inference service that turns face images into embeddings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FaceServiceSettings {
    pub url: String,
    /// Upper bound for a single request to the service, in seconds.
    pub timeout_secs: u64,
    /// Length of the vectors produced by the active model.
    pub embedding_dimension: usize,
    /// Cosine distance at or below which two faces are considered the same person.
    pub match_threshold: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EnrollmentSettings {
    pub max_captures: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MaintenanceSettings {
    /// Unreferenced images younger than this are left alone, they may belong to an enrollment in flight.
    pub orphan_grace_minutes: u64,
    pub dry_run: bool,
}

/// Database connection pool configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
    pub acquire_timeout: u64,
}
