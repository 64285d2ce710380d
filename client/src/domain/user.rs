//! User identifiers, records, and request payloads.
//!
//! The coordinator never validates user input, so these types only give the
//! loosely shaped JSON a name. Identifiers are carried verbatim into URL paths.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Caller-supplied request payload: field name to JSON value.
pub type Payload = Map<String, Value>;

/// Identifier of a user account as the server spells it.
///
/// Numeric identifiers are kept in their decimal form so they round-trip
/// into paths such as `/s/users/42` unchanged.
///
/// # Examples
/// ```
/// use client::domain::UserId;
///
/// assert_eq!(UserId::from(42_u64).as_ref(), "42");
/// assert_eq!(UserId::from("abc").to_string(), "abc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Read an identifier out of a JSON value.
    ///
    /// Strings are taken as-is and integers are rendered in decimal. Any
    /// other shape yields `None`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(raw) => Some(Self(raw.clone())),
            Value::Number(number) if number.is_i64() || number.is_u64() => {
                Some(Self(number.to_string()))
            }
            _ => None,
        }
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// User record as returned by the accounts API.
///
/// The record is an open JSON object; only `id` has meaning to the
/// coordinator. Related collections are merged in by
/// [`crate::domain::AccountResponse::into_user_with_related`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(Map<String, Value>);

impl UserRecord {
    /// Wrap a JSON object as a user record.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Identifier of the record, if present and well formed.
    #[must_use]
    pub fn id(&self) -> Option<UserId> {
        self.0.get("id").and_then(UserId::from_value)
    }

    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Whether the record carries `field`.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Set `field`, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }
}

impl From<UserRecord> for Value {
    fn from(value: UserRecord) -> Self {
        Self::Object(value.0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("abc"), Some("abc"))]
    #[case(json!(42), Some("42"))]
    #[case(json!(-7), Some("-7"))]
    #[case(json!(1.5), None)]
    #[case(json!(null), None)]
    #[case(json!({"id": 1}), None)]
    fn user_id_reads_strings_and_integers(#[case] value: Value, #[case] expected: Option<&str>) {
        let id = UserId::from_value(&value);
        assert_eq!(id.as_ref().map(AsRef::as_ref), expected);
    }

    #[rstest]
    fn user_id_is_not_normalised() {
        let id = UserId::from(" spaced id ");
        assert_eq!(id.as_ref(), " spaced id ");
    }

    #[rstest]
    fn record_exposes_identifier_and_fields() {
        let Value::Object(fields) = json!({"id": 42, "name": "A"}) else {
            panic!("fixture must be an object");
        };
        let mut record = UserRecord::new(fields);
        assert_eq!(record.id(), Some(UserId::from(42_u64)));
        assert_eq!(record.get("name"), Some(&json!("A")));

        record.insert("posts", json!([]));
        assert!(record.contains("posts"));
        assert_eq!(Value::from(record), json!({"id": 42, "name": "A", "posts": []}));
    }

    #[rstest]
    fn record_without_identifier_reports_none() {
        assert!(UserRecord::default().id().is_none());
    }
}
