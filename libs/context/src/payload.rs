//! Data bag and payload variants for response helpers

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// Per-request view/response model.
pub type DataBag = Map<String, Value>;

/// What a response helper should do with the caller's data.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    /// Use the data bag as is.
    #[default]
    Empty,
    /// Merge every entry into the data bag, then use the data bag.
    Merge(DataBag),
    /// Use this value directly and leave the data bag untouched.
    Replace(Value),
}

impl Payload {
    pub fn merge<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Payload::Merge(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn replace<T: Serialize>(value: T) -> Result<Self> {
        Ok(Payload::Replace(serde_json::to_value(value)?))
    }
}

impl From<DataBag> for Payload {
    fn from(map: DataBag) -> Self {
        Payload::Merge(map)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Replace(value)
    }
}

impl From<Option<Value>> for Payload {
    fn from(value: Option<Value>) -> Self {
        value.map(Payload::Replace).unwrap_or_default()
    }
}
