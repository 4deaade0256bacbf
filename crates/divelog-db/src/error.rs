use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Dive {dive_number} already exists for user '{user_id}'")]
    DuplicateKey { user_id: String, dive_number: i32 },

    #[error(transparent)]
    CoreError(#[from] divelog_core::error::CoreError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;
