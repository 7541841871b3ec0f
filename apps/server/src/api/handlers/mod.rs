//! Request handlers for API endpoints
//!
//! Every handler takes the request [`Context`](strata_context::Context) as
//! its last extractor and answers through its response helpers.

pub mod data;
pub mod pages;
pub mod users;

pub use data::*;
pub use pages::*;
pub use users::*;
