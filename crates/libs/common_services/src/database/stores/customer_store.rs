use crate::database::DbError;
use crate::database::tables::customer::{
    Customer, CustomerFace, CustomerSummary, NewCustomer, NewFaceCapture, PinFace,
};
use pgvector::Vector;
use sqlx::{Executor, Postgres};

/// Queries for `customers` and `customer_faces`.
///
/// Every method takes an executor, so it runs against the pool or inside a transaction the
/// caller owns. Nothing in here begins or commits a transaction.
pub struct CustomerStore;

impl CustomerStore {
    //================================================================================
    // Writes
    //================================================================================

    /// Inserts a customer. Fails with [`DbError::UniqueViolation`] when the (name, pin) pair exists.
    pub async fn create(
        executor: impl Executor<'_, Database = Postgres>,
        customer: &NewCustomer,
    ) -> Result<Customer, DbError> {
        Ok(sqlx::query_as::<_, Customer>(
            r"
            INSERT INTO customers (name, pin)
            VALUES ($1, $2)
            RETURNING id, name, pin, created_at, updated_at
            ",
        )
        .bind(&customer.name)
        .bind(&customer.pin)
        .fetch_one(executor)
        .await?)
    }

    /// Inserts one face capture. Fails with [`DbError::ForeignKeyViolation`] for an unknown customer.
    pub async fn add_face(
        executor: impl Executor<'_, Database = Postgres>,
        face: &NewFaceCapture,
    ) -> Result<CustomerFace, DbError> {
        Ok(sqlx::query_as::<_, CustomerFace>(
            r"
            INSERT INTO customer_faces (customer_id, face_embedding, image_path, capture_index)
            VALUES ($1, $2, $3, $4)
            RETURNING id, customer_id, face_embedding, image_path, capture_index, created_at, updated_at
            ",
        )
        .bind(face.customer_id)
        .bind(Vector::from(face.embedding.clone()))
        .bind(&face.image_path)
        .bind(face.capture_index)
        .fetch_one(executor)
        .await?)
    }

    //================================================================================
    // Reads
    //================================================================================

    pub async fn list_with_face_count(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<Vec<CustomerSummary>, DbError> {
        Ok(sqlx::query_as::<_, CustomerSummary>(
            r"
            SELECT c.id, c.name, c.created_at, COUNT(f.id) AS face_count
            FROM customers c
            LEFT JOIN customer_faces f ON f.customer_id = c.id
            GROUP BY c.id
            ORDER BY c.created_at DESC
            ",
        )
        .fetch_all(executor)
        .await?)
    }

    pub async fn find_by_pin(
        executor: impl Executor<'_, Database = Postgres>,
        pin: &str,
    ) -> Result<Vec<Customer>, DbError> {
        Ok(sqlx::query_as::<_, Customer>(
            r"
            SELECT id, name, pin, created_at, updated_at
            FROM customers
            WHERE pin = $1
            ",
        )
        .bind(pin)
        .fetch_all(executor)
        .await?)
    }

    /// Number of stored faces over all customers sharing a PIN.
    pub async fn count_faces_by_pin(
        executor: impl Executor<'_, Database = Postgres>,
        pin: &str,
    ) -> Result<i64, DbError> {
        Ok(sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM customer_faces f
            JOIN customers c ON c.id = f.customer_id
            WHERE c.pin = $1
            ",
        )
        .bind(pin)
        .fetch_one(executor)
        .await?)
    }

    pub async fn faces_by_pin(
        executor: impl Executor<'_, Database = Postgres>,
        pin: &str,
    ) -> Result<Vec<PinFace>, DbError> {
        Ok(sqlx::query_as::<_, PinFace>(
            r"
            SELECT f.customer_id, c.name, f.image_path, f.face_embedding
            FROM customer_faces f
            JOIN customers c ON c.id = f.customer_id
            WHERE c.pin = $1
            ",
        )
        .bind(pin)
        .fetch_all(executor)
        .await?)
    }

    /// Every image file name referenced by a face row.
    pub async fn all_image_paths(
        executor: impl Executor<'_, Database = Postgres>,
    ) -> Result<Vec<String>, DbError> {
        Ok(
            sqlx::query_scalar::<_, String>("SELECT image_path FROM customer_faces")
                .fetch_all(executor)
                .await?,
        )
    }
}
