use crate::api_state::ApiContext;
use crate::kiosk::handlers::{face_match_handler, pin_lookup_handler};
use axum::{Router, routing::post};

pub fn kiosk_public_router() -> Router<ApiContext> {
    Router::new()
        .route("/kiosk/pin-lookup", post(pin_lookup_handler))
        .route("/kiosk/face-match", post(face_match_handler))
}
