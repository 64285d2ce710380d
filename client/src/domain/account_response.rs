//! Decoding of successful account responses.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::ports::TransportRejection;
use crate::domain::user::{UserId, UserRecord};

/// Optional collections `GET /s/users/{id}` may return beside the user.
pub const RELATED_COLLECTIONS: [&str; 4] = ["avatar", "posts", "sets", "follows"];

/// Reasons a success body cannot feed the success notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseDecodeError {
    /// The body is not a JSON object.
    #[error("account response must be a JSON object")]
    NotAnObject,
    /// The body has no `user` object.
    #[error("account response is missing the user record")]
    MissingUser,
    /// The `user` object has no string or integer `id`.
    #[error("user record is missing a usable id")]
    MissingUserId,
}

impl From<ResponseDecodeError> for TransportRejection {
    fn from(value: ResponseDecodeError) -> Self {
        Self::message(value.to_string())
    }
}

/// Successful account response: the user record plus whatever else the
/// server sent alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountResponse {
    user: UserRecord,
    rest: Map<String, Value>,
}

impl AccountResponse {
    /// Split a response body into its user record and remaining members.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseDecodeError::NotAnObject`] for non-object bodies and
    /// [`ResponseDecodeError::MissingUser`] when `user` is absent or not an
    /// object.
    pub fn from_value(body: Value) -> Result<Self, ResponseDecodeError> {
        let Value::Object(mut rest) = body else {
            return Err(ResponseDecodeError::NotAnObject);
        };
        match rest.remove("user") {
            Some(Value::Object(fields)) => Ok(Self {
                user: UserRecord::new(fields),
                rest,
            }),
            _ => Err(ResponseDecodeError::MissingUser),
        }
    }

    /// Identifier of the returned user.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseDecodeError::MissingUserId`] when the record has no
    /// string or integer `id`.
    pub fn user_id(&self) -> Result<UserId, ResponseDecodeError> {
        self.user.id().ok_or(ResponseDecodeError::MissingUserId)
    }

    /// The user record as returned.
    #[must_use]
    pub fn into_user(self) -> UserRecord {
        self.user
    }

    /// The user record with every present related collection merged in.
    ///
    /// A collection that is absent or `null` in the response is skipped, so
    /// it never clears a field the record already carries.
    #[must_use]
    pub fn into_user_with_related(self) -> UserRecord {
        let Self { mut user, mut rest } = self;
        for collection in RELATED_COLLECTIONS {
            match rest.remove(collection) {
                None | Some(Value::Null) => {}
                Some(value) => user.insert(collection, value),
            }
        }
        user
    }
}
