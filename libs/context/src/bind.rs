//! Request binder
//!
//! Deserializes a buffered request payload into a typed value, picking the
//! decoder from the `Content-Type` header:
//! - empty body: URL query string
//! - `application/json`, `application/*+json` or no content type: JSON
//! - `application/x-www-form-urlencoded`: form fields

use axum::http::{header, HeaderMap};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

pub fn bind_bytes<T: DeserializeOwned>(
    headers: &HeaderMap,
    query: Option<&str>,
    body: &[u8],
) -> Result<T> {
    if body.is_empty() {
        return serde_urlencoded::from_str(query.unwrap_or(""))
            .map_err(|e| Error::Bind(format!("Invalid query string: {}", e)));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match media_type.as_str() {
        "" | "application/json" => bind_json(body),
        "application/x-www-form-urlencoded" => serde_urlencoded::from_bytes(body)
            .map_err(|e| Error::Bind(format!("Invalid form body: {}", e))),
        other if other.starts_with("application/") && other.ends_with("+json") => {
            bind_json(body)
        }
        other => Err(Error::UnsupportedMediaType(other.to_string())),
    }
}

fn bind_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| Error::Bind(format!("Invalid JSON in request body: {}", e)))
}
