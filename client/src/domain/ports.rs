//! Domain ports defining the edges of the coordinator.
//!
//! The coordinator talks to three collaborators it does not own: the HTTP
//! transport, the application store, and the browser's navigation. Each is a
//! trait here so adapters (and test doubles) are injected at construction.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;

use super::intent::Destination;
use super::notification::Notification;

/// HTTP methods used by the accounts API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether a payload travels in the query string rather than the body.
    #[must_use]
    pub const fn sends_query(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request issued through the [`Transport`] port.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Site-relative path, e.g. `/s/users/42`.
    pub path: String,
    /// Optional JSON payload.
    pub payload: Option<Value>,
}

impl TransportRequest {
    /// Build a request.
    pub fn new(method: HttpMethod, path: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            payload,
        }
    }
}

/// Opaque rejection value produced by a [`Transport`].
///
/// The coordinator never classifies a rejection; it forwards
/// [`TransportRejection::payload`] to the store unchanged.
///
/// # Examples
/// ```
/// use client::domain::ports::TransportRejection;
/// use serde_json::json;
///
/// let rejection = TransportRejection::new(json!({"field": "email", "msg": "taken"}));
/// assert_eq!(rejection.into_payload(), json!({"field": "email", "msg": "taken"}));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("request rejected: {payload}")]
pub struct TransportRejection {
    payload: Value,
}

impl TransportRejection {
    /// Wrap a rejection value.
    pub fn new(payload: impl Into<Value>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Rejection carrying only a human-readable `message`.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(json!({ "message": message.into() }))
    }

    /// Rejection tagged with a failure `kind` and a `message`.
    pub fn with_kind(kind: &str, message: impl Into<String>) -> Self {
        Self::new(json!({ "kind": kind, "message": message.into() }))
    }

    /// Borrow the rejection value.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Consume the rejection, returning its value.
    #[must_use]
    pub fn into_payload(self) -> Value {
        self.payload
    }
}

/// Driven port performing one HTTP exchange.
///
/// Implementations resolve with the parsed response body or reject with a
/// normalised [`TransportRejection`]. Timeouts, if any, belong here.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue `request` and wait for it to settle.
    async fn request(&self, request: TransportRequest) -> Result<Value, TransportRejection>;
}

/// Driven port accepting notifications for the application store.
///
/// Dispatch is synchronous and fire-and-forget; the coordinator never reads
/// store state back.
pub trait Store: Send + Sync {
    /// Hand `notification` to the store.
    fn dispatch(&self, notification: Notification);
}

/// Driven port performing a full page navigation.
///
/// This is deliberately separate from client-side routing: a full navigation
/// is the only way for the browser to re-fetch the page with the HTTP-only
/// session cookie the server has just set or cleared.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Replace the current page with `destination`.
    fn force_navigation(&self, destination: Destination);
}
