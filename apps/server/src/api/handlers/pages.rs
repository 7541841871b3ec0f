//! HTML page handlers
//!
//! Pages render through the context's template renderer; the data bag is
//! the default view model.

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
};
use serde::Serialize;
use strata_context::{Context, Payload, Result};

#[derive(Debug, Serialize)]
struct Greeting {
    name: String,
}

/// Landing page (GET /)
pub async fn index(State(state): State<AppState>, mut ctx: Context) -> Result<Response> {
    ctx.set_data("version", env!("CARGO_PKG_VERSION"));
    ctx.set_data("service", state.config.logging.service_name.clone());
    ctx.display("index.html", Payload::merge([("title", "Strata")]))
}

/// Greeting page (GET /hello/:name)
///
/// Renders with its own model instead of the data bag.
pub async fn hello(Path(name): Path<String>, mut ctx: Context) -> Result<Response> {
    ctx.display("hello.html", Payload::replace(Greeting { name })?)
}
