use crate::api_state::ApiContext;
use crate::root::handlers::{health_check, load_model};
use axum::{
    Router,
    routing::{get, post},
};

pub fn root_public_router() -> Router<ApiContext> {
    Router::new()
        .route("/health", get(health_check))
        .route("/load-model", post(load_model))
}
