use axum::{Router, routing::get};

use crate::state::AppState;

pub mod health;
pub mod users;

pub const USERS_PATH: &str = "/users";

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
pub fn routes(state: &AppState) -> Router {
    Router::new().nest(USERS_PATH, users::router(state))
}

/// Router with the /ready endpoint, stateful so it can reach the pool.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
