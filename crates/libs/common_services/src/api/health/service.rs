use crate::api::health::error::HealthError;
use crate::api::health::interfaces::{HealthResponse, LoadModelResponse};
use crate::database::ping;
use crate::face_client::{FaceClient, FaceModel};
use app_state::AppSettings;
use sqlx::PgPool;
use tracing::{info, instrument};

fn build_commit() -> String {
    std::env::var("GIT_COMMIT").unwrap_or_else(|_| "unknown".to_string())
}

/// Status of the API and of everything it depends on. Always succeeds; a dependency that is down
/// shows up as `false` in the response.
pub async fn health_check(
    pool: &PgPool,
    face_client: &FaceClient,
    settings: &AppSettings,
) -> HealthResponse {
    let (database, face) = tokio::join!(ping(pool), face_client.health());

    HealthResponse {
        ok: true,
        service: "api".to_string(),
        commit: build_commit(),
        database,
        face,
        config: settings.redacted(),
    }
}

#[instrument(skip(face_client))]
pub async fn load_model(
    face_client: &FaceClient,
    model: FaceModel,
) -> Result<LoadModelResponse, HealthError> {
    face_client.load_model(model).await?;
    info!("Model {} loaded successfully", model);

    Ok(LoadModelResponse {
        ok: true,
        message: format!("Model '{model}' loaded successfully"),
        model,
    })
}
