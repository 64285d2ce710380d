//! Reqwest-backed transport adapter for the accounts API.
//!
//! This adapter owns transport details only: URL resolution, payload
//! encoding, timeout, and normalising every failure into the opaque JSON
//! value the coordinator forwards to the store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::{Value, json};
use thiserror::Error;

use crate::domain::ports::{HttpMethod, Transport, TransportRejection, TransportRequest};
use crate::settings::ClientSettings;

/// Failure to construct an [`HttpTransport`].
#[derive(Debug, Error)]
pub enum HttpTransportBuildError {
    /// The configured base URL does not parse.
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    /// The reqwest client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Transport adapter sending requests to one accounts API origin.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Build an adapter with a cookie store, a request timeout, and the given
    /// user agent.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Build an adapter from loaded settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is invalid or the client cannot be
    /// constructed.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, HttpTransportBuildError> {
        let base_url = settings.base_url()?;
        Ok(Self::new(
            base_url,
            settings.request_timeout(),
            settings.user_agent(),
        )?)
    }

    /// Origin requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: TransportRequest) -> Result<Value, TransportRejection> {
        let url = self.base_url.join(&request.path).map_err(|error| {
            TransportRejection::with_kind("request", format!("invalid request path: {error}"))
        })?;

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(payload) = &request.payload {
            builder = if request.method.sends_query() {
                builder.query(&query_pairs(payload))
            } else {
                builder.json(payload)
            };
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_body(body.as_ref())
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn query_pairs(payload: &Value) -> Vec<(String, String)> {
    let Value::Object(fields) = payload else {
        return Vec::new();
    };
    fields
        .iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(raw) => Some((key.clone(), raw.clone())),
            other => Some((key.clone(), other.to_string())),
        })
        .collect()
}

fn parse_body(body: &[u8]) -> Result<Value, TransportRejection> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|error| {
        TransportRejection::with_kind("decode", format!("invalid JSON response: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> TransportRejection {
    let kind = if error.is_timeout() { "timeout" } else { "network" };
    TransportRejection::with_kind(kind, error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TransportRejection {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut fields)) => match fields.remove("errors") {
            Some(errors) => TransportRejection::new(errors),
            None => TransportRejection::new(Value::Object(fields)),
        },
        Ok(Value::Null) | Err(_) => TransportRejection::new(json!({
            "status": status.as_u16(),
            "message": status_message(status, body),
        })),
        Ok(other) => TransportRejection::new(other),
    }
}

fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        status
            .canonical_reason()
            .map_or_else(|| format!("status {}", status.as_u16()), str::to_owned)
    } else {
        preview
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn query_pairs_keep_strings_and_encode_the_rest() {
        let pairs = query_pairs(&json!({
            "include": "posts",
            "page": 2,
            "full": true,
            "skip": null,
            "tags": ["a", "b"],
        }));
        assert!(pairs.contains(&("include".to_owned(), "posts".to_owned())));
        assert!(pairs.contains(&("page".to_owned(), "2".to_owned())));
        assert!(pairs.contains(&("full".to_owned(), "true".to_owned())));
        assert!(pairs.contains(&("tags".to_owned(), "[\"a\",\"b\"]".to_owned())));
        assert_eq!(pairs.len(), 4, "null values are skipped");
    }

    #[rstest]
    fn query_pairs_ignore_non_objects() {
        assert!(query_pairs(&json!([1, 2])).is_empty());
    }

    #[rstest]
    #[case(b"".as_slice(), Value::Null)]
    #[case(b"  \n".as_slice(), Value::Null)]
    #[case(br#"{"user":{"id":1}}"#.as_slice(), json!({"user": {"id": 1}}))]
    fn parses_success_bodies(#[case] body: &[u8], #[case] expected: Value) {
        assert_eq!(parse_body(body).expect("body parses"), expected);
    }

    #[rstest]
    fn malformed_success_bodies_are_decode_rejections() {
        let rejection = parse_body(b"<html>").expect_err("HTML is not JSON");
        assert_eq!(rejection.payload().get("kind"), Some(&json!("decode")));
    }

    #[rstest]
    #[case::errors_member(
        br#"{"errors":{"field":"email","msg":"taken"}}"#.as_slice(),
        json!({"field": "email", "msg": "taken"})
    )]
    #[case::whole_object(
        br#"{"field":"email","msg":"taken"}"#.as_slice(),
        json!({"field": "email", "msg": "taken"})
    )]
    #[case::array_body(br#"[{"msg":"taken"}]"#.as_slice(), json!([{"msg": "taken"}]))]
    fn json_error_bodies_are_forwarded(#[case] body: &[u8], #[case] expected: Value) {
        let rejection = map_status_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(rejection.into_payload(), expected);
    }

    #[rstest]
    #[case(StatusCode::BAD_GATEWAY, b"upstream   down".as_slice(), "upstream down")]
    #[case(StatusCode::UNAUTHORIZED, b"".as_slice(), "Unauthorized")]
    fn non_json_error_bodies_carry_status_and_preview(
        #[case] status: StatusCode,
        #[case] body: &[u8],
        #[case] message: &str,
    ) {
        let rejection = map_status_error(status, body);
        assert_eq!(
            rejection.into_payload(),
            json!({"status": status.as_u16(), "message": message})
        );
    }

    #[rstest]
    fn long_previews_are_truncated() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }
}
