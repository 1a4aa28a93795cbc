use crate::api_state::ApiContext;
use crate::create_router;
use app_state::AppSettings;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get_service;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use common_services::face_client::FaceClient;
use http::{HeaderValue, header};
use sqlx::PgPool;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Enrollment bodies carry several base64 images.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// The full application: routes, stored image files and middleware.
pub fn build_app(api_state: ApiContext) -> Router {
    let settings = api_state.settings.clone();

    // --- CORS Configuration ---
    let allowed_origins: Vec<HeaderValue> = settings
        .api
        .allowed_origins
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(hv) => Some(hv),
            Err(e) => {
                error!("Invalid CORS origin configured: {} - Error: {}", s, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods(cors::Any)
        .allow_origin(allowed_origins)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN]);

    // Stored capture files
    let serve_dir = ServeDir::new(&settings.storage.images_dir);

    create_router(api_state)
        .nest_service("/images", get_service(serve_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn serve(pool: PgPool, settings: AppSettings) -> Result<()> {
    // --- Server Startup ---
    info!("Initializing server...");
    let face_client = FaceClient::with_base_url(&settings.face_service.url)
        .timeout(settings.face_service.timeout())
        .build()?;
    info!("Face service at {}", settings.face_service.url);
    info!("Images stored in {:?}", settings.storage.images_dir);

    let addr: SocketAddr = format!("{}:{}", settings.api.host, settings.api.port)
        .parse()
        .map_err(|e| eyre!("Invalid address: {}", e))?;
    let public_url = settings.api.public_url.trim_end_matches('/').to_string();
    let app = build_app(ApiContext::new(pool, face_client, settings));

    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);
    info!("API docs at {}/docs", public_url);
    axum::serve(listener, app).await?;
    Ok(())
}
