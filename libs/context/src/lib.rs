//! Per-request context for axum handlers
//!
//! Wraps an inbound request and augments it with:
//! - response format tracking and negotiation
//! - a per-request data bag used as view/response model
//! - body buffering with replay
//! - template, structured-data and error response helpers
//!
//! Install [`new_context`] as middleware and take [`Context`] as the last
//! extractor of a handler.

pub mod bind;
pub mod context;
pub mod envelope;
pub mod error;
pub mod format;
pub mod middleware;
pub mod payload;
pub mod render;

pub use context::{get_context, Context, IntoContext};
pub use envelope::Output;
pub use error::{AppError, Error, Result};
pub use format::{Format, FORMAT_HTML, FORMAT_JSON, FORMAT_JSONP, FORMAT_RAW, FORMAT_XML};
pub use middleware::{new_context, ContextSettings};
pub use payload::{DataBag, Payload};
pub use render::{Renderer, SharedRenderer, TeraRenderer};
