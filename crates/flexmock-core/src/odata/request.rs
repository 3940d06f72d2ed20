//! Request and response types exchanged with the mock engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ODATA_VERSION: &str = "OData-Version";
pub const ODATA_VERSION_VALUE: &str = "4.0";

pub const CONTENT_TYPE_JSON: &str = "application/json; odata.metadata=minimal";
pub const CONTENT_TYPE_XML: &str = "application/xml";
pub const CONTENT_TYPE_COUNT: &str = "text/plain;charset=UTF-8;IEEE754Compatible=true";

/// HTTP method of an intercepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a method name is not one of the known verbs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// A request as seen by the interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    pub method: HttpMethod,
    /// Full or service-relative URL including the query string
    pub url: String,
    /// Raw request body
    pub body: Option<String>,
}

impl MockRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn body_str(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

/// Typed response payload, serialized only when the response leaves the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Text(String),
    Json(Value),
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Text(text) => f.write_str(text),
            ResponseBody::Json(value) => write!(f, "{value}"),
        }
    }
}

/// Synthesized HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    /// Headers in emission order
    pub headers: Vec<(String, String)>,
    pub body: Option<ResponseBody>,
}

impl MockResponse {
    /// Response with the given status and the mandatory `OData-Version` header.
    pub fn odata(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
        }
        .header(ODATA_VERSION, ODATA_VERSION_VALUE)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: ResponseBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as it would go over the wire.
    pub fn body_text(&self) -> Option<String> {
        self.body.as_ref().map(ToString::to_string)
    }

    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            Some(ResponseBody::Json(value)) => Some(value),
            _ => None,
        }
    }
}

/// Reason phrase for the status codes the engine emits.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("GET", HttpMethod::Get)]
    #[case("patch", HttpMethod::Patch)]
    #[case("Delete", HttpMethod::Delete)]
    #[case("POST", HttpMethod::Post)]
    fn test_http_method_from_str(#[case] input: &str, #[case] expected: HttpMethod) {
        assert_eq!(input.parse::<HttpMethod>(), Ok(expected));
        assert_eq!(expected.to_string(), input.to_ascii_uppercase());
    }

    #[rstest]
    fn test_http_method_unknown() {
        let err = "MERGE".parse::<HttpMethod>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown HTTP method: MERGE");
    }

    #[rstest]
    fn test_odata_response_always_carries_version() {
        let response = MockResponse::odata(204);
        assert_eq!(response.header_value("odata-version"), Some("4.0"));
        assert_eq!(response.body_text(), None);
    }

    #[rstest]
    fn test_json_body_serializes_compactly() {
        let response =
            MockResponse::odata(200).with_body(ResponseBody::Json(json!({"value": [1, 2]})));
        assert_eq!(response.body_text().as_deref(), Some(r#"{"value":[1,2]}"#));
        assert_eq!(response.json(), Some(&json!({"value": [1, 2]})));
    }

    #[rstest]
    #[case(200, "OK")]
    #[case(201, "Created")]
    #[case(204, "No Content")]
    #[case(299, "")]
    fn test_reason_phrase(#[case] status: u16, #[case] expected: &str) {
        assert_eq!(reason_phrase(status), expected);
    }
}
