use app_state::AppSettings;
use axum::extract::FromRef;
use common_services::face_client::{FaceClient, FaceClientError};
use sqlx::PgPool;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Switching models makes the inference service load weights from disk, which takes far longer
/// than an embedding request.
const MODEL_LOAD_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct ApiContext {
    pub pool: PgPool,
    pub face_client: FaceClient,
    pub settings: AppSettings,
    model_admin: Arc<OnceLock<FaceClient>>,
}

impl ApiContext {
    #[must_use]
    pub fn new(pool: PgPool, face_client: FaceClient, settings: AppSettings) -> Self {
        Self {
            pool,
            face_client,
            settings,
            model_admin: Arc::new(OnceLock::new()),
        }
    }

    /// Client used for model switches, created on first use.
    pub fn model_admin(&self) -> Result<&FaceClient, FaceClientError> {
        if let Some(client) = self.model_admin.get() {
            return Ok(client);
        }
        let client = FaceClient::with_base_url(&self.settings.face_service.url)
            .timeout(MODEL_LOAD_TIMEOUT)
            .build()?;
        Ok(self.model_admin.get_or_init(|| client))
    }
}

// These impls allow Axum to extract parts of the ApiContext directly.
impl FromRef<ApiContext> for PgPool {
    fn from_ref(state: &ApiContext) -> Self {
        state.pool.clone()
    }
}

impl FromRef<ApiContext> for FaceClient {
    fn from_ref(state: &ApiContext) -> Self {
        state.face_client.clone()
    }
}

impl FromRef<ApiContext> for AppSettings {
    fn from_ref(state: &ApiContext) -> Self {
        state.settings.clone()
    }
}
