/// Database error type returned by the connectors
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Driver or query error from SeaORM
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;
