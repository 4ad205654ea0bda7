//! # pfy-server
//!
//! axum surface for Projectify: JSON REST under `/api/v1` (bearer token
//! required) and the live notification socket at `/ws`.
//!
//! Successful responses use the envelope in [`envelope`]; failures go
//! through [`error::ApiError`].

pub mod auth;
pub mod envelope;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use axum::routing::get;

pub use state::AppState;

/// The full application router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/tasks", routes::tasks::router())
        .nest("/notifications", routes::notifications::router())
        .nest("/task-comments", routes::comments::router())
        .nest("/groups", routes::groups::router())
        .nest("/categories", routes::categories::router())
        .nest("/users", routes::users::router());

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/ws", get(routes::ws::connect))
        .nest("/api/v1", api)
        .with_state(state)
}
