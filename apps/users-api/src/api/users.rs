use axum::Router;
use domain_users::{InMemoryUserRepository, PgUserRepository, UserService, handlers};

use crate::state::AppState;

/// Users router over PostgreSQL when a pool is present, otherwise in memory
pub fn router(state: &AppState) -> Router {
    match &state.db {
        Some(db) => handlers::router(UserService::new(PgUserRepository::new(db.clone()))),
        None => {
            tracing::warn!("Using in-memory users store; data is lost on restart");
            handlers::router(UserService::new(InMemoryUserRepository::new()))
        }
    }
}
