//! JSON endpoints built on the response envelope

use crate::api::middleware::RequestId;
use axum::response::Response;
use serde_json::json;
use strata_context::{Context, Payload, Result, FORMAT_HTML};

/// Request profile (GET /api/profile)
///
/// Answers with an HTML page when the context format is `html`, with the
/// JSON (or JSONP) envelope otherwise. The format comes from the context
/// middleware, so `context.negotiate_format = false` keeps this route on
/// the envelope unless an explicit format was set.
pub async fn profile(mut ctx: Context) -> Result<Response> {
    let request_id = ctx
        .request()
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone());
    let ajax = ctx.is_ajax();
    let format = ctx.get_format().to_string();

    ctx.set_data("request_id", request_id);
    ctx.set_data("ajax", ajax);
    ctx.set_data("format", format.clone());

    let extra = Payload::merge([("user", "guest")]);
    if format == FORMAT_HTML {
        ctx.display("profile.html", extra)
    } else {
        ctx.ret_data(extra)
    }
}

/// Echo the raw request body (POST /api/echo)
pub async fn echo(mut ctx: Context) -> Result<Response> {
    let body = ctx.get_body().await?;
    let length = ctx.raw_body().map(|b| b.len()).unwrap_or(0);
    ctx.ret_data(Payload::Replace(json!({ "body": body, "length": length })))
}

/// Always fails (GET /api/fail?code=...)
///
/// Exercises the error envelope; `code` overrides the error code.
pub async fn fail(ctx: Context) -> Result<Response> {
    let code = ctx.query_param("code").and_then(|c| c.parse::<i32>().ok());
    ctx.ret_error("Requested failure", code)
}
