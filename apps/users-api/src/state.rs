//! Application state shared by the route builders.

use database::postgres::DatabaseConnection;

/// Cloned into each router that needs it; the connection pool is an `Arc` internally.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL pool, absent when the in-memory store is selected
    pub db: Option<DatabaseConnection>,
}
