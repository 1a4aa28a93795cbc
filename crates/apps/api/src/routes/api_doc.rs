use crate::routes::{customers, kiosk, root};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::health_check,
        root::handlers::load_model,
        // Customer handlers
        customers::handlers::enroll_customer_handler,
        customers::handlers::list_customers_handler,
        // Kiosk handlers
        kiosk::handlers::pin_lookup_handler,
        kiosk::handlers::face_match_handler,
    ),
    tags(
        (name = "Customers", description = "Customer registration with face captures"),
        (name = "Kiosk", description = "PIN lookup and face matching at the kiosk"),
        (name = "System", description = "Health check and model management"),
    )
)]
pub struct ApiDoc;
