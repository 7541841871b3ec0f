use crate::api::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Envelope endpoints, nested under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::profile))
        .route("/echo", post(handlers::echo))
        .route("/users", post(handlers::create_user))
        .route("/fail", get(handlers::fail))
}
