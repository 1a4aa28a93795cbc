use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::State;
use axum_extra::extract::WithRejection;
use common_services::api::health::error::HealthError;
use common_services::api::health::interfaces::{
    HealthResponse, LoadModelRequest, LoadModelResponse,
};
use common_services::api::health::service;

#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses(
        (status = 200, description = "Status of the API, the database and the face service", body = HealthResponse),
    )
)]
pub async fn health_check(State(context): State<ApiContext>) -> Json<HealthResponse> {
    Json(service::health_check(&context.pool, &context.face_client, &context.settings).await)
}

/// Switch the model used by the face service.
#[utoipa::path(
    post,
    path = "/load-model",
    tag = "System",
    request_body = LoadModelRequest,
    responses(
        (status = 200, description = "Model loaded", body = LoadModelResponse),
        (status = 400, description = "Malformed body or unknown model."),
        (status = 502, description = "The face service rejected the request."),
        (status = 503, description = "The face service could not be reached."),
    )
)]
pub async fn load_model(
    State(context): State<ApiContext>,
    WithRejection(Json(payload), _): WithRejection<Json<LoadModelRequest>, HealthError>,
) -> Result<Json<LoadModelResponse>, HealthError> {
    let client = context.model_admin()?;
    Ok(Json(service::load_model(client, payload.model).await?))
}
