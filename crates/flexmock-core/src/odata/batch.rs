//! Multipart `$batch` framing.
//!
//! Parsing follows the fixed shape the UI5 OData v4 model emits: the outer boundary is
//! the first body line, an optional change set announces its inner boundary in the
//! first outer part, and every request part ends with exactly one body line.

use crate::odata::request::{
    reason_phrase, HttpMethod, MockRequest, MockResponse, ResponseBody, CONTENT_TYPE,
};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static CHANGE_SET_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"multipart/mixed;\s*boundary=([^\r\n]+)").expect("valid boundary pattern")
});

static REQUEST_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(GET|DELETE|PATCH|POST) (\S+)(?:[^\r\n]|\r?\n)+\r?\n([^\r\n]*)\r?\n$")
        .expect("valid part pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("Batch request body does not start with a boundary")]
    MissingBoundary,
    #[error("Batch request contains no parts")]
    NoParts,
    #[error("Malformed batch part {index}: {part:?}")]
    MalformedPart { index: usize, part: String },
    #[error("No response for batch part {index}: {method} {url}")]
    UnansweredPart {
        index: usize,
        method: HttpMethod,
        url: String,
    },
}

/// A `$batch` body split into its individual requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// First body line, including the leading `--`
    pub outer_boundary: String,
    /// Change-set boundary without the leading `--`
    pub inner_boundary: Option<String>,
    pub parts: Vec<MockRequest>,
}

impl BatchRequest {
    pub fn parse(body: &str) -> Result<Self, BatchError> {
        let outer_boundary = body
            .split(['\r', '\n'])
            .next()
            .filter(|line| !line.is_empty())
            .ok_or(BatchError::MissingBoundary)?
            .to_string();

        let outer_parts = inner_segments(body, &outer_boundary);
        let first = outer_parts.first().ok_or(BatchError::NoParts)?;

        let inner_boundary = CHANGE_SET_BOUNDARY
            .captures(first)
            .map(|caps| caps[1].trim().to_string());

        let raw_parts = match &inner_boundary {
            Some(inner) => inner_segments(first, &format!("--{inner}")),
            None => outer_parts,
        };

        let parts = raw_parts
            .iter()
            .enumerate()
            .map(|(index, part)| parse_part(index, part))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            outer_boundary,
            inner_boundary,
            parts,
        })
    }

    /// Assemble the multipart response mirroring this request's boundaries.
    ///
    /// `responses` must be in part order.
    pub fn render(&self, responses: &[MockResponse]) -> MockResponse {
        let mut body = String::new();

        let part_boundary = match &self.inner_boundary {
            Some(inner) => {
                body.push_str(&self.outer_boundary);
                body.push_str("\r\n");
                body.push_str(&format!(
                    "{CONTENT_TYPE}: multipart/mixed; boundary={inner}\r\n\r\n"
                ));
                format!("--{inner}")
            }
            None => self.outer_boundary.clone(),
        };

        for (index, response) in responses.iter().enumerate() {
            body.push_str(&part_boundary);
            body.push_str("\r\n");
            body.push_str(&format!("{CONTENT_TYPE}: application/http\r\n"));
            if self.inner_boundary.is_some() {
                body.push_str(&format!("Content-ID: {index}.0\r\n"));
            }
            body.push_str(&format!(
                "\r\nHTTP/1.1 {} {}\r\n",
                response.status,
                reason_phrase(response.status)
            ));
            if response.status != 204 {
                for (name, value) in &response.headers {
                    body.push_str(&format!("{name}: {value}\r\n"));
                }
            }
            body.push_str("\r\n");
            if let Some(text) = response.body_text() {
                body.push_str(&text);
            }
            body.push_str("\r\n");
        }

        if let Some(inner) = &self.inner_boundary {
            body.push_str(&format!("--{inner}--\r\n"));
        }
        body.push_str(&self.outer_boundary);
        body.push_str("--");

        let outer_name = self
            .outer_boundary
            .strip_prefix("--")
            .unwrap_or(&self.outer_boundary);

        MockResponse::odata(200)
            .header(CONTENT_TYPE, format!("multipart/mixed;boundary={outer_name}"))
            .with_body(ResponseBody::Text(body))
    }
}

/// Segments strictly between the first and last occurrence of `boundary`.
fn inner_segments<'a>(text: &'a str, boundary: &str) -> Vec<&'a str> {
    let segments: Vec<&str> = text.split(boundary).collect();
    if segments.len() < 3 {
        return Vec::new();
    }
    segments[1..segments.len() - 1].to_vec()
}

fn parse_part(index: usize, part: &str) -> Result<MockRequest, BatchError> {
    let malformed = || BatchError::MalformedPart {
        index,
        part: part.to_string(),
    };
    let caps = REQUEST_PART.captures(part).ok_or_else(malformed)?;
    let method: HttpMethod = caps[1].parse().map_err(|_| malformed())?;
    let request = MockRequest::new(method, &caps[2]);
    let body = caps[3].trim();
    Ok(if body.is_empty() {
        request
    } else {
        request.with_body(body)
    })
}
