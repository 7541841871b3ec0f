//! Response format vocabulary and negotiation
//!
//! The context stores its format as a plain string so applications can use
//! their own values. The five values below are the ones the helpers in this
//! crate understand.

use axum::http::{header, HeaderMap};

pub const FORMAT_RAW: &str = "raw";
pub const FORMAT_HTML: &str = "html";
pub const FORMAT_JSON: &str = "json";
pub const FORMAT_JSONP: &str = "jsonp";
pub const FORMAT_XML: &str = "xml";

/// Query parameter that explicitly selects a format.
pub const FORMAT_PARAM: &str = "_format";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Raw,
    Html,
    Json,
    Jsonp,
    Xml,
}

impl Format {
    /// Parse a short name or MIME type.
    ///
    /// Matching is case-insensitive and ignores MIME parameters such as
    /// `charset`.
    pub fn parse(s: &str) -> Option<Self> {
        let mime_type = s.split(';').next().unwrap_or(s).trim();
        let s_lower = mime_type.to_ascii_lowercase();

        match s_lower.as_str() {
            "raw" | "text/plain" | "application/octet-stream" => Some(Self::Raw),
            "html" | "text/html" | "application/xhtml+xml" => Some(Self::Html),
            "json" | "application/json" => Some(Self::Json),
            "jsonp" | "application/javascript" | "text/javascript" => Some(Self::Jsonp),
            "xml" | "application/xml" | "text/xml" => Some(Self::Xml),
            other if other.starts_with("application/") && other.ends_with("+json") => {
                Some(Self::Json)
            }
            other if other.starts_with("application/") && other.ends_with("+xml") => {
                Some(Self::Xml)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => FORMAT_RAW,
            Self::Html => FORMAT_HTML,
            Self::Json => FORMAT_JSON,
            Self::Jsonp => FORMAT_JSONP,
            Self::Xml => FORMAT_XML,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Raw => "text/plain; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
            Self::Json => "application/json",
            Self::Jsonp => "application/javascript; charset=utf-8",
            Self::Xml => "application/xml; charset=utf-8",
        }
    }

    /// Pick a format from the request.
    ///
    /// Priority:
    /// 1. `_format` query parameter
    /// 2. first recognised entry of the `Accept` header
    ///
    /// Wildcards (`*/*`) are not a preference and yield `None`.
    pub fn negotiate(query: Option<&str>, headers: &HeaderMap) -> Option<Self> {
        if let Some(query) = query {
            let explicit = serde_urlencoded::from_str::<Vec<(String, String)>>(query)
                .ok()
                .and_then(|pairs| {
                    pairs
                        .into_iter()
                        .find(|(k, _)| k == FORMAT_PARAM)
                        .and_then(|(_, v)| Self::parse(&v))
                });
            if explicit.is_some() {
                return explicit;
            }
        }

        headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .and_then(|accept| accept.split(',').find_map(Self::parse))
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Format {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("json"), Some(Format::Json));
        assert_eq!(Format::parse("JSONP"), Some(Format::Jsonp));
        assert_eq!(Format::parse("text/html; charset=utf-8"), Some(Format::Html));
        assert_eq!(Format::parse("application/problem+json"), Some(Format::Json));
        assert_eq!(Format::parse("application/atom+xml"), Some(Format::Xml));
        assert_eq!(Format::parse("*/*"), None);
        assert_eq!(Format::parse("yaml"), None);
    }

    #[test]
    fn test_format_round_trip_names() {
        for format in [
            Format::Raw,
            Format::Html,
            Format::Json,
            Format::Jsonp,
            Format::Xml,
        ] {
            assert_eq!(format.as_str().parse::<Format>(), Ok(format));
        }
    }

    #[test]
    fn test_negotiate_prefers_query_parameter() {
        let mut headers = HeaderMap::new();
        headers.insert("accept", "text/html".parse().unwrap());

        let format = Format::negotiate(Some("page=2&_format=jsonp"), &headers);
        assert_eq!(format, Some(Format::Jsonp));
    }

    #[test]
    fn test_negotiate_from_accept_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .parse()
                .unwrap(),
        );

        assert_eq!(Format::negotiate(None, &headers), Some(Format::Html));
    }

    #[test]
    fn test_negotiate_unknown_query_value_falls_back_to_accept() {
        let mut headers = HeaderMap::new();
        headers.insert("accept", "application/json".parse().unwrap());

        let format = Format::negotiate(Some("_format=yaml"), &headers);
        assert_eq!(format, Some(Format::Json));
    }

    #[test]
    fn test_negotiate_wildcard_only() {
        let mut headers = HeaderMap::new();
        headers.insert("accept", "*/*".parse().unwrap());
        assert_eq!(Format::negotiate(None, &headers), None);
        assert_eq!(Format::negotiate(None, &HeaderMap::new()), None);
    }
}
