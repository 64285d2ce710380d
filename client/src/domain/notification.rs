//! Notifications handed to the application store.
//!
//! Notifications are write-only outputs of the coordinator: it builds one,
//! passes it to [`crate::domain::ports::Store::dispatch`], and never looks at
//! it again. The serde representation is the store's wire format: a `type`
//! discriminator in SCREAMING_SNAKE_CASE plus the tag-specific fields.

use serde::Serialize;
use serde_json::Value;

use crate::domain::user::{UserId, UserRecord};

/// Sub-state of the password recovery page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordPageState {
    /// A reset token was sent; the user should check their inbox.
    Inbox,
}

/// Immutable record describing one event for the store to fold into state.
///
/// # Examples
/// ```
/// use client::domain::Notification;
///
/// let notification = Notification::SetSendingOn;
/// assert_eq!(notification.tag(), "SET_SENDING_ON");
/// assert_eq!(
///     serde_json::to_value(&notification).unwrap(),
///     serde_json::json!({"type": "SET_SENDING_ON"}),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notification {
    /// A mutating request is in flight.
    SetSendingOn,
    /// The in-flight mutating request settled.
    SetSendingOff,
    /// Account creation started.
    CreateUser,
    /// Profile update started for `id`.
    UpdateUser {
        /// Account being updated.
        id: UserId,
    },
    /// Fetch of the signed-in account started.
    GetCurrentUser,
    /// Fetch of account `id` started.
    GetUser {
        /// Account being fetched.
        id: UserId,
    },
    /// Log in started.
    LogInUser,
    /// Log out started.
    LogOutUser,
    /// Password reset token request started.
    GetPasswordToken,
    /// Password creation via token started.
    CreatePassword,
    /// The signed-in account is now known.
    SetCurrentUserId {
        /// Identifier of the signed-in account.
        #[serde(rename = "currentUserID")]
        current_user_id: UserId,
        /// Success message, when this is the operation's terminal notification.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<&'static str>,
    },
    /// A user record to merge into the store.
    AddUser {
        /// Record returned by the server.
        user: UserRecord,
        /// Success message.
        message: &'static str,
    },
    /// The operation failed.
    SetErrors {
        /// Fixed per-intent failure message.
        message: &'static str,
        /// Rejection value exactly as the transport produced it.
        errors: Value,
    },
    /// The session ended; forget the signed-in account.
    ResetCurrentUserId {
        /// Success message.
        message: &'static str,
    },
    /// Move the password page to a new sub-state.
    SetPasswordPageState {
        /// New page state.
        state: PasswordPageState,
        /// Success message.
        message: &'static str,
    },
}

impl Notification {
    /// Wire discriminator of this notification.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::SetSendingOn => "SET_SENDING_ON",
            Self::SetSendingOff => "SET_SENDING_OFF",
            Self::CreateUser => "CREATE_USER",
            Self::UpdateUser { .. } => "UPDATE_USER",
            Self::GetCurrentUser => "GET_CURRENT_USER",
            Self::GetUser { .. } => "GET_USER",
            Self::LogInUser => "LOG_IN_USER",
            Self::LogOutUser => "LOG_OUT_USER",
            Self::GetPasswordToken => "GET_PASSWORD_TOKEN",
            Self::CreatePassword => "CREATE_PASSWORD",
            Self::SetCurrentUserId { .. } => "SET_CURRENT_USER_ID",
            Self::AddUser { .. } => "ADD_USER",
            Self::SetErrors { .. } => "SET_ERRORS",
            Self::ResetCurrentUserId { .. } => "RESET_CURRENT_USER_ID",
            Self::SetPasswordPageState { .. } => "SET_PASSWORD_PAGE_STATE",
        }
    }
}

#[cfg(test)]
mod tests {
    //! Wire format coverage for notifications.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Notification::SetSendingOff)]
    #[case(Notification::UpdateUser { id: UserId::from(7_u64) })]
    #[case(Notification::SetCurrentUserId {
        current_user_id: UserId::from(7_u64),
        message: None,
    })]
    #[case(Notification::ResetCurrentUserId { message: "log out user success" })]
    #[case(Notification::SetPasswordPageState {
        state: PasswordPageState::Inbox,
        message: "get password token success",
    })]
    fn tag_matches_serialised_type(#[case] notification: Notification) {
        let value = serde_json::to_value(&notification).expect("notification serialises");
        assert_eq!(value.get("type"), Some(&json!(notification.tag())));
    }

    #[rstest]
    fn current_user_id_uses_store_field_name() {
        let notification = Notification::SetCurrentUserId {
            current_user_id: UserId::from(42_u64),
            message: Some("log in user success"),
        };
        assert_eq!(
            serde_json::to_value(&notification).expect("notification serialises"),
            json!({
                "type": "SET_CURRENT_USER_ID",
                "currentUserID": "42",
                "message": "log in user success",
            }),
        );
    }

    #[rstest]
    fn absent_message_is_omitted() {
        let notification = Notification::SetCurrentUserId {
            current_user_id: UserId::from("u-1"),
            message: None,
        };
        assert_eq!(
            serde_json::to_value(&notification).expect("notification serialises"),
            json!({"type": "SET_CURRENT_USER_ID", "currentUserID": "u-1"}),
        );
    }

    #[rstest]
    fn errors_are_serialised_verbatim() {
        let notification = Notification::SetErrors {
            message: "create user failure",
            errors: json!({"field": "email", "msg": "taken"}),
        };
        assert_eq!(
            serde_json::to_value(&notification).expect("notification serialises"),
            json!({
                "type": "SET_ERRORS",
                "message": "create user failure",
                "errors": {"field": "email", "msg": "taken"},
            }),
        );
    }

    #[rstest]
    fn password_page_state_is_snake_case() {
        let notification = Notification::SetPasswordPageState {
            state: PasswordPageState::Inbox,
            message: "get password token success",
        };
        let value = serde_json::to_value(&notification).expect("notification serialises");
        assert_eq!(value.get("state"), Some(&json!("inbox")));
    }
}
