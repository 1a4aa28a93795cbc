use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err
                .constraint()
                .map_or_else(|| db_err.message().to_string(), str::to_string);
            match db_err.kind() {
                ErrorKind::UniqueViolation => return Self::UniqueViolation(constraint),
                ErrorKind::ForeignKeyViolation => return Self::ForeignKeyViolation(constraint),
                _ => {}
            }
        }
        Self::Sqlx(err)
    }
}
