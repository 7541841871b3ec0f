//! Response envelopes
//!
//! Every structured (non-template) response uses the same wrapper:
//! `{"Code": 0, "Message": "ok", "Data": <payload>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub const SUCCESS_CODE: i32 = 0;
pub const SUCCESS_MESSAGE: &str = "ok";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub code: i32,
    pub message: String,
    pub data: Value,
}

impl Output {
    pub fn success(data: Value) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: SUCCESS_MESSAGE.to_string(),
            data,
        }
    }

    pub fn failure(code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data: data.unwrap_or(Value::Null),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::success(Value::Null)
    }
}

/// Serialize `output` as a JSONP script calling `callback`.
pub fn to_jsonp(callback: &str, output: &Output) -> Result<String> {
    let json = serde_json::to_string(output)?;
    Ok(format!("{callback}({json});"))
}

/// Accepts dotted JavaScript identifier paths such as `cb` or `app.handlers.load`.
pub fn is_valid_callback(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 128
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => chars
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
                _ => false,
            }
        })
}
