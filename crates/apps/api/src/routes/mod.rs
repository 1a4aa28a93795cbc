mod api_doc;
pub mod customers;
pub mod kiosk;
pub mod root;

use crate::api_state::ApiContext;
use crate::customers::router::customers_public_router;
use crate::kiosk::router::kiosk_public_router;
use crate::root::router::root_public_router;
use crate::routes::api_doc::ApiDoc;
use axum::Router;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

// --- Router Construction ---
pub fn create_router(api_state: ApiContext) -> Router {
    Router::new()
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .merge(public_routes())
        .with_state(api_state)
}

fn public_routes() -> Router<ApiContext> {
    Router::new()
        .merge(root_public_router())
        .merge(customers_public_router())
        .merge(kiosk_public_router())
}
