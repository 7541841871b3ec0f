use crate::api::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

/// HTML pages rendered through the template renderer
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/hello/:name", get(handlers::hello))
}
