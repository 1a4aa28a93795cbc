//! Runs against a real PostgreSQL with pgvector. Start one, export `DATABASE_URL` and run
//! `cargo test -- --ignored`.

use async_trait::async_trait;
use common_services::api::enrollment::interfaces::{
    CaptureInput, EnrollCustomerRequest, EnrollmentOptions,
};
use common_services::api::enrollment::service::enroll_customer;
use common_services::database::customer_store::CustomerStore;
use common_services::database::enrollment_store::PgEnrollmentStore;
use common_services::database::run_migrations;
use common_services::face_client::{FaceClientError, FaceEmbedder};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

struct FixedEmbedder {
    fail: bool,
}

#[async_trait]
impl FaceEmbedder for FixedEmbedder {
    async fn embed(&self, _image_b64: &str) -> Result<Vec<f32>, FaceClientError> {
        if self.fail {
            return Err(FaceClientError::NoFace);
        }
        Ok(vec![0.5, 0.5, 0.0])
    }
}

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new().connect(&url).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

fn request(name: &str, pin: &str, captures: usize) -> EnrollCustomerRequest {
    EnrollCustomerRequest {
        name: name.to_string(),
        pin: pin.to_string(),
        captures: vec![CaptureInput::Image(PNG_B64.to_string()); captures],
    }
}

fn unique_name() -> String {
    format!("test-{}", Uuid::new_v4())
}

#[tokio::test]
#[ignore = "requires PostgreSQL with pgvector"]
async fn test_enrollment_commits_customer_and_faces() {
    let pool = pool().await;
    let images = tempfile::tempdir().unwrap();
    let options = EnrollmentOptions {
        images_dir: images.path().to_path_buf(),
        embedding_dimension: 3,
        max_captures: 5,
    };
    let pin = "48151623";

    let response = enroll_customer(
        &PgEnrollmentStore::new(pool.clone()),
        &FixedEmbedder { fail: false },
        &options,
        &request(&unique_name(), pin, 2),
    )
    .await
    .unwrap();

    assert_eq!(response.face_count, 2);
    let faces = CustomerStore::faces_by_pin(&pool, pin).await.unwrap();
    let ours: Vec<_> = faces
        .iter()
        .filter(|f| f.customer_id == response.customer_id)
        .collect();
    assert_eq!(ours.len(), 2);
    assert!(ours.iter().all(|f| f.face_embedding.as_slice().len() == 3));

    let referenced = CustomerStore::all_image_paths(&pool).await.unwrap();
    assert!(response.image_paths.iter().all(|p| referenced.contains(p)));
}

#[tokio::test]
#[ignore = "requires PostgreSQL with pgvector"]
async fn test_failed_enrollment_leaves_no_rows() {
    let pool = pool().await;
    let images = tempfile::tempdir().unwrap();
    let options = EnrollmentOptions {
        images_dir: images.path().to_path_buf(),
        embedding_dimension: 3,
        max_captures: 5,
    };
    let name = unique_name();

    let err = enroll_customer(
        &PgEnrollmentStore::new(pool.clone()),
        &FixedEmbedder { fail: true },
        &options,
        &request(&name, "9876", 1),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "ValidationError");

    let customers = CustomerStore::find_by_pin(&pool, "9876").await.unwrap();
    assert!(customers.iter().all(|c| c.name != name));
}

#[tokio::test]
#[ignore = "requires PostgreSQL with pgvector"]
async fn test_concurrent_duplicates_get_one_conflict() {
    let pool = pool().await;
    let images = tempfile::tempdir().unwrap();
    let options = EnrollmentOptions {
        images_dir: images.path().to_path_buf(),
        embedding_dimension: 3,
        max_captures: 5,
    };
    let store = PgEnrollmentStore::new(pool.clone());
    let embedder = FixedEmbedder { fail: false };
    let enrollment = request(&unique_name(), "5555", 1);

    let (a, b) = tokio::join!(
        enroll_customer(&store, &embedder, &options, &enrollment),
        enroll_customer(&store, &embedder, &options, &enrollment),
    );

    let codes: Vec<&str> = [&a, &b]
        .iter()
        .filter_map(|r| r.as_ref().err().map(|e| e.code()))
        .collect();
    assert_eq!(codes, vec!["ConstraintError"]);
}
