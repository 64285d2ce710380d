//! Per-intent protocol table.
//!
//! Every intent follows the same three phases; the differences between them
//! are data, collected here so the coordinator can run one skeleton.

use std::fmt;

use crate::domain::ports::HttpMethod;

/// Target of a forced full page navigation.
///
/// Hard navigation is the only way to pick up (or drop) the HTTP-only session
/// cookie the server sets, so these are the only places the coordinator ever
/// sends the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// The signed-in landing page, `/my_sets`.
    MySets,
    /// The site root, `/`.
    Home,
}

impl Destination {
    /// Site-relative path of the destination.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::MySets => "/my_sets",
            Self::Home => "/",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// One of the eight user-account intents the coordinator supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Register a new account.
    CreateUser,
    /// Update an account's profile.
    UpdateUser,
    /// Fetch the signed-in account.
    GetCurrentUser,
    /// Fetch an account by identifier.
    GetUser,
    /// Start a session.
    LogInUser,
    /// End the session.
    LogOutUser,
    /// Ask for a password reset token.
    GetUserPasswordToken,
    /// Set a new password using a reset token.
    CreateUserPassword,
}

impl Intent {
    /// Every intent, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::CreateUser,
        Self::UpdateUser,
        Self::GetCurrentUser,
        Self::GetUser,
        Self::LogInUser,
        Self::LogOutUser,
        Self::GetUserPasswordToken,
        Self::CreateUserPassword,
    ];

    /// Stable name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateUser => "create_user",
            Self::UpdateUser => "update_user",
            Self::GetCurrentUser => "get_current_user",
            Self::GetUser => "get_user",
            Self::LogInUser => "log_in_user",
            Self::LogOutUser => "log_out_user",
            Self::GetUserPasswordToken => "get_user_password_token",
            Self::CreateUserPassword => "create_user_password",
        }
    }

    /// HTTP method of the intent's single request.
    #[must_use]
    pub const fn method(self) -> HttpMethod {
        match self {
            Self::CreateUser
            | Self::LogInUser
            | Self::GetUserPasswordToken
            | Self::CreateUserPassword => HttpMethod::Post,
            Self::UpdateUser => HttpMethod::Put,
            Self::GetCurrentUser | Self::GetUser => HttpMethod::Get,
            Self::LogOutUser => HttpMethod::Delete,
        }
    }

    /// Whether the intent is wrapped in a `SetSendingOn`/`SetSendingOff` pair.
    ///
    /// Reads are not: only intents that mutate account or session state hold
    /// the busy flag.
    #[must_use]
    pub const fn toggles_busy(self) -> bool {
        !matches!(self, Self::GetCurrentUser | Self::GetUser)
    }

    /// Message attached to the intent's success notification.
    #[must_use]
    pub const fn success_message(self) -> &'static str {
        match self {
            Self::CreateUser => "create user success",
            Self::UpdateUser => "update user success",
            Self::GetCurrentUser => "get current user success",
            Self::GetUser => "get user success",
            Self::LogInUser => "log in user success",
            Self::LogOutUser => "log out user success",
            Self::GetUserPasswordToken => "get password token success",
            Self::CreateUserPassword => "create password success",
        }
    }

    /// Message attached to the intent's `SetErrors` notification.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::CreateUser => "create user failure",
            Self::UpdateUser => "update user failure",
            Self::GetCurrentUser => "get current user failure",
            Self::GetUser => "get user failure",
            Self::LogInUser => "log in user failure",
            Self::LogOutUser => "log out user failure",
            Self::GetUserPasswordToken => "get password token failure",
            Self::CreateUserPassword => "create password failure",
        }
    }

    /// Where a successful settlement forces the browser, if anywhere.
    #[must_use]
    pub const fn destination(self) -> Option<Destination> {
        match self {
            Self::CreateUser | Self::LogInUser | Self::CreateUserPassword => {
                Some(Destination::MySets)
            }
            Self::LogOutUser => Some(Destination::Home),
            Self::UpdateUser
            | Self::GetCurrentUser
            | Self::GetUser
            | Self::GetUserPasswordToken => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
