use crate::database::DbError;
use crate::database::customer_store::CustomerStore;
use crate::database::tables::customer::{Customer, CustomerFace, NewCustomer, NewFaceCapture};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

/// The writes an enrollment needs, grouped in a unit of work.
///
/// `begin` hands out a transaction handle that every write takes explicitly; the caller ends it
/// with exactly one of `commit` or `rollback`.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx, DbError>;

    async fn create_customer(
        &self,
        tx: &mut Self::Tx,
        customer: &NewCustomer,
    ) -> Result<Customer, DbError>;

    async fn add_face_capture(
        &self,
        tx: &mut Self::Tx,
        face: &NewFaceCapture,
    ) -> Result<CustomerFace, DbError>;

    async fn commit(&self, tx: Self::Tx) -> Result<(), DbError>;

    async fn rollback(&self, tx: Self::Tx) -> Result<(), DbError>;
}

/// [`EnrollmentStore`] on PostgreSQL. Transactions run at the server default, READ COMMITTED.
#[derive(Clone)]
pub struct PgEnrollmentStore {
    pool: PgPool,
}

impl PgEnrollmentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentStore for PgEnrollmentStore {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx, DbError> {
        Ok(self.pool.begin().await?)
    }

    async fn create_customer(
        &self,
        tx: &mut Self::Tx,
        customer: &NewCustomer,
    ) -> Result<Customer, DbError> {
        CustomerStore::create(&mut **tx, customer).await
    }

    async fn add_face_capture(
        &self,
        tx: &mut Self::Tx,
        face: &NewFaceCapture,
    ) -> Result<CustomerFace, DbError> {
        CustomerStore::add_face(&mut **tx, face).await
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), DbError> {
        Ok(tx.commit().await?)
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), DbError> {
        Ok(tx.rollback().await?)
    }
}
