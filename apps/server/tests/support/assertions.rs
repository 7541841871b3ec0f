use anyhow::Context as _;
use axum::http::{header, HeaderMap, StatusCode};
use serde_json::Value;

pub fn assert_status(actual: StatusCode, expected: StatusCode, what: &str) {
    assert_eq!(actual, expected, "unexpected status for {what}");
}

/// Parse an envelope body and check its `Code`.
pub fn envelope(body: &[u8], expected_code: i64) -> anyhow::Result<Value> {
    let value: Value = serde_json::from_slice(body).context("parse envelope JSON")?;
    for key in ["Code", "Message", "Data"] {
        assert!(value.get(key).is_some(), "envelope is missing {key}: {value}");
    }
    assert_eq!(
        value["Code"].as_i64(),
        Some(expected_code),
        "unexpected envelope code: {value}"
    );
    Ok(value)
}

pub fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
