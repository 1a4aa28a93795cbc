use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::WithRejection;
use common_services::api::enrollment::error::EnrollmentError;
use common_services::api::enrollment::interfaces::{
    EnrollCustomerRequest, EnrollResponse, EnrollmentOptions,
};
use common_services::api::enrollment::service::enroll_customer;
use common_services::database::customer_store::CustomerStore;
use common_services::database::enrollment_store::PgEnrollmentStore;
use common_services::database::tables::customer::CustomerSummary;
use tracing::instrument;

/// Register a customer with one or more face captures.
///
/// The customer and all captures are stored together, or not at all.
#[utoipa::path(
    post,
    path = "/customers",
    tag = "Customers",
    request_body = EnrollCustomerRequest,
    responses(
        (status = 201, description = "Customer registered", body = EnrollResponse),
        (status = 400, description = "Malformed body, invalid request, undecodable image or no usable face."),
        (status = 409, description = "A customer with this name and PIN already exists."),
        (status = 503, description = "The face service could not be reached."),
        (status = 500, description = "A database or storage error occurred."),
    )
)]
#[instrument(skip_all)]
pub async fn enroll_customer_handler(
    State(context): State<ApiContext>,
    WithRejection(Json(payload), _): WithRejection<Json<EnrollCustomerRequest>, EnrollmentError>,
) -> Result<(StatusCode, Json<EnrollResponse>), EnrollmentError> {
    let store = PgEnrollmentStore::new(context.pool.clone());
    let options = EnrollmentOptions::from(&context.settings);
    let response = enroll_customer(&store, &context.face_client, &options, &payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// List registered customers with their number of stored faces.
#[utoipa::path(
    get,
    path = "/customers",
    tag = "Customers",
    responses(
        (status = 200, description = "Registered customers, newest first", body = Vec<CustomerSummary>),
        (status = 500, description = "A database error occurred."),
    )
)]
pub async fn list_customers_handler(
    State(context): State<ApiContext>,
) -> Result<Json<Vec<CustomerSummary>>, EnrollmentError> {
    let customers = CustomerStore::list_with_face_count(&context.pool).await?;
    Ok(Json(customers))
}
