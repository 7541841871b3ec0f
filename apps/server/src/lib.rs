//! Strata demo server
//!
//! An axum application wired through the request context layer:
//! - HTML pages rendered from templates
//! - JSON / JSONP envelope endpoints
//! - request binding and validation with uniform error envelopes

pub mod api;
pub mod config;
pub mod logging;
pub mod state;

pub use config::Config;
pub use state::AppState;
