use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::State;
use axum_extra::extract::WithRejection;
use common_services::api::kiosk::error::KioskError;
use common_services::api::kiosk::interfaces::{
    FaceMatchRequest, FaceMatchResponse, PinLookupRequest, PinLookupResponse,
};
use common_services::api::kiosk::service::{face_match, pin_lookup};

/// Check that a PIN belongs to a customer with a registered face.
#[utoipa::path(
    post,
    path = "/kiosk/pin-lookup",
    tag = "Kiosk",
    request_body = PinLookupRequest,
    responses(
        (status = 200, description = "Whether the PIN is eligible for face matching", body = PinLookupResponse),
        (status = 400, description = "Malformed body."),
        (status = 500, description = "A database error occurred."),
    )
)]
pub async fn pin_lookup_handler(
    State(context): State<ApiContext>,
    WithRejection(Json(payload), _): WithRejection<Json<PinLookupRequest>, KioskError>,
) -> Result<Json<PinLookupResponse>, KioskError> {
    Ok(Json(pin_lookup(&context.pool, &payload.pin).await?))
}

/// Match a live face capture against the customers sharing a PIN.
#[utoipa::path(
    post,
    path = "/kiosk/face-match",
    tag = "Kiosk",
    request_body = FaceMatchRequest,
    responses(
        (status = 200, description = "Matching customers, or the reason there are none", body = FaceMatchResponse),
        (status = 400, description = "Malformed body or no usable face in the capture."),
        (status = 503, description = "The face service could not be reached."),
    )
)]
pub async fn face_match_handler(
    State(context): State<ApiContext>,
    WithRejection(Json(payload), _): WithRejection<Json<FaceMatchRequest>, KioskError>,
) -> Result<Json<FaceMatchResponse>, KioskError> {
    let threshold = context.settings.face_service.match_threshold;
    Ok(Json(
        face_match(&context.pool, &context.face_client, threshold, &payload).await?,
    ))
}
