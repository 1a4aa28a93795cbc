use crate::api_state::ApiContext;
use crate::customers::handlers::{enroll_customer_handler, list_customers_handler};
use axum::{Router, routing::get};

pub fn customers_public_router() -> Router<ApiContext> {
    Router::new().route(
        "/customers",
        get(list_customers_handler).post(enroll_customer_handler),
    )
}
