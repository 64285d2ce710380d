//! Account action coordinator.
//!
//! Each operation runs the same three phases:
//!
//! 1. Announce: `SetSendingOn` (mutating intents only), then the
//!    intent-started notification, dispatched before the operation returns.
//! 2. Dispatch: exactly one [`Transport`] request, driven by a spawned task.
//! 3. Settle: success notifications and any forced navigation, or a single
//!    `SetErrors`; mutating intents finish with `SetSendingOff`.
//!
//! Ordering is only guaranteed within one invocation. Concurrent calls are
//! neither serialised nor coalesced, and a [`Settlement`] cannot cancel its
//! request: dropping it detaches the task, which still settles and still
//! clears the busy flag.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::domain::account_response::{AccountResponse, ResponseDecodeError};
use crate::domain::intent::Intent;
use crate::domain::notification::{Notification, PasswordPageState};
use crate::domain::ports::{Navigator, Store, Transport, TransportRejection, TransportRequest};
use crate::domain::user::{Payload, UserId};

const USERS_PATH: &str = "/s/users";
const CURRENT_USER_PATH: &str = "/s/users/current";
const SESSIONS_PATH: &str = "/s/sessions";
const PASSWORD_TOKENS_PATH: &str = "/s/password_tokens";

/// Builds the success notifications from a response body.
type Settle = fn(Intent, Value) -> Result<Vec<Notification>, ResponseDecodeError>;

/// How one invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request succeeded and its success notifications were dispatched.
    Succeeded,
    /// The request was rejected and `SetErrors` was dispatched.
    Failed,
    /// The settling task did not finish: a collaborator panicked or the
    /// runtime shut down first.
    Interrupted,
}

/// Pending result of one operation invocation.
///
/// Awaiting it is optional; the invocation settles either way.
#[derive(Debug)]
#[must_use = "a settlement reports when the operation has fully settled"]
pub struct Settlement {
    intent: Intent,
    handle: JoinHandle<Outcome>,
}

impl Settlement {
    /// Intent this settlement belongs to.
    pub const fn intent(&self) -> Intent {
        self.intent
    }
}

impl Future for Settlement {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let intent = self.intent;
        Pin::new(&mut self.handle).poll(cx).map(|joined| {
            joined.unwrap_or_else(|join_error| {
                error!(intent = intent.name(), error = %join_error, "account action did not settle");
                Outcome::Interrupted
            })
        })
    }
}

/// An intent together with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountCommand {
    /// Register a new account with `data`.
    CreateUser {
        /// Registration fields.
        data: Payload,
    },
    /// Update account `id` with `data`.
    UpdateUser {
        /// Account to update.
        id: UserId,
        /// Profile fields.
        data: Payload,
    },
    /// Fetch the signed-in account.
    GetCurrentUser,
    /// Fetch account `id`.
    GetUser {
        /// Account to fetch.
        id: UserId,
        /// Pagination and inclusion options.
        options: Payload,
    },
    /// Start a session.
    LogInUser {
        /// Login credentials.
        credentials: Payload,
    },
    /// End the session.
    LogOutUser,
    /// Ask for a password reset token.
    GetUserPasswordToken {
        /// Contact details the token is sent to.
        contact: Payload,
    },
    /// Set a new password for account `id`.
    CreateUserPassword {
        /// Account whose password is set.
        id: UserId,
        /// Token and new password.
        data: Payload,
    },
}

impl AccountCommand {
    /// Intent the command runs.
    #[must_use]
    pub const fn intent(&self) -> Intent {
        match self {
            Self::CreateUser { .. } => Intent::CreateUser,
            Self::UpdateUser { .. } => Intent::UpdateUser,
            Self::GetCurrentUser => Intent::GetCurrentUser,
            Self::GetUser { .. } => Intent::GetUser,
            Self::LogInUser { .. } => Intent::LogInUser,
            Self::LogOutUser => Intent::LogOutUser,
            Self::GetUserPasswordToken { .. } => Intent::GetUserPasswordToken,
            Self::CreateUserPassword { .. } => Intent::CreateUserPassword,
        }
    }
}

/// Coordinates user-account intents between the UI, the store, and the
/// accounts API.
///
/// Operations must be called from within a Tokio runtime; each spawns the
/// task that drives its request to settlement.
#[derive(Clone)]
pub struct AccountActions {
    transport: Arc<dyn Transport>,
    store: Arc<dyn Store>,
    navigator: Arc<dyn Navigator>,
}

impl AccountActions {
    /// Build a coordinator over the given collaborators.
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn Store>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            store,
            navigator,
        }
    }

    /// Run any intent from its command form.
    pub fn perform(&self, command: AccountCommand) -> Settlement {
        match command {
            AccountCommand::CreateUser { data } => self.create_user(data),
            AccountCommand::UpdateUser { id, data } => self.update_user(id, data),
            AccountCommand::GetCurrentUser => self.get_current_user(),
            AccountCommand::GetUser { id, options } => self.get_user(id, options),
            AccountCommand::LogInUser { credentials } => self.log_in_user(credentials),
            AccountCommand::LogOutUser => self.log_out_user(),
            AccountCommand::GetUserPasswordToken { contact } => {
                self.get_user_password_token(contact)
            }
            AccountCommand::CreateUserPassword { id, data } => self.create_user_password(id, data),
        }
    }

    /// Register an account: `POST /s/users`, then navigate to `/my_sets`.
    pub fn create_user(&self, data: Payload) -> Settlement {
        self.run(
            Intent::CreateUser,
            Notification::CreateUser,
            USERS_PATH,
            Some(Value::Object(data)),
            settle_current_user_id,
        )
    }

    /// Update account `id`: `PUT /s/users/{id}`.
    pub fn update_user(&self, id: UserId, data: Payload) -> Settlement {
        let path = format!("{USERS_PATH}/{id}");
        self.run(
            Intent::UpdateUser,
            Notification::UpdateUser { id },
            path,
            Some(Value::Object(data)),
            settle_add_user,
        )
    }

    /// Fetch the signed-in account: `GET /s/users/current`.
    ///
    /// On success `SetCurrentUserId` is dispatched before `AddUser`.
    pub fn get_current_user(&self) -> Settlement {
        self.run(
            Intent::GetCurrentUser,
            Notification::GetCurrentUser,
            CURRENT_USER_PATH,
            None,
            settle_current_user,
        )
    }

    /// Fetch account `id` with `options`: `GET /s/users/{id}`.
    ///
    /// Related collections present in the response are merged onto the
    /// dispatched user record.
    pub fn get_user(&self, id: UserId, options: Payload) -> Settlement {
        let path = format!("{USERS_PATH}/{id}");
        self.run(
            Intent::GetUser,
            Notification::GetUser { id },
            path,
            Some(Value::Object(options)),
            settle_user_with_related,
        )
    }

    /// Start a session: `POST /s/sessions`, then navigate to `/my_sets`.
    pub fn log_in_user(&self, credentials: Payload) -> Settlement {
        self.run(
            Intent::LogInUser,
            Notification::LogInUser,
            SESSIONS_PATH,
            Some(Value::Object(credentials)),
            settle_current_user_id,
        )
    }

    /// End the session: `DELETE /s/sessions`, then navigate to `/`.
    pub fn log_out_user(&self) -> Settlement {
        self.run(
            Intent::LogOutUser,
            Notification::LogOutUser,
            SESSIONS_PATH,
            None,
            settle_reset_current_user_id,
        )
    }

    /// Ask for a password reset token: `POST /s/password_tokens`.
    pub fn get_user_password_token(&self, contact: Payload) -> Settlement {
        self.run(
            Intent::GetUserPasswordToken,
            Notification::GetPasswordToken,
            PASSWORD_TOKENS_PATH,
            Some(Value::Object(contact)),
            settle_password_page_inbox,
        )
    }

    /// Set a new password: `POST /s/users/{id}/password`, then navigate to
    /// `/my_sets`.
    pub fn create_user_password(&self, id: UserId, data: Payload) -> Settlement {
        let path = format!("{USERS_PATH}/{id}/password");
        self.run(
            Intent::CreateUserPassword,
            Notification::CreatePassword,
            path,
            Some(Value::Object(data)),
            settle_current_user_id,
        )
    }

    fn run(
        &self,
        intent: Intent,
        started: Notification,
        path: impl Into<String>,
        payload: Option<Value>,
        settle: Settle,
    ) -> Settlement {
        let request = TransportRequest::new(intent.method(), path, payload);
        let span = info_span!("account_action", intent = intent.name(), invocation = %Uuid::new_v4());
        span.in_scope(|| {
            if intent.toggles_busy() {
                self.store.dispatch(Notification::SetSendingOn);
            }
            self.store.dispatch(started);
        });

        let transport = Arc::clone(&self.transport);
        let store = Arc::clone(&self.store);
        let navigator = Arc::clone(&self.navigator);
        let task = async move {
            debug!(method = %request.method, path = %request.path, "issuing account request");
            let settled = transport
                .request(request)
                .await
                .and_then(|body| settle(intent, body).map_err(TransportRejection::from));

            let outcome = match settled {
                Ok(notifications) => {
                    for notification in notifications {
                        store.dispatch(notification);
                    }
                    if let Some(destination) = intent.destination() {
                        info!(%destination, "forcing full page navigation");
                        navigator.force_navigation(destination);
                    }
                    Outcome::Succeeded
                }
                Err(rejection) => {
                    warn!(error = %rejection, "account request rejected");
                    store.dispatch(Notification::SetErrors {
                        message: intent.failure_message(),
                        errors: rejection.into_payload(),
                    });
                    Outcome::Failed
                }
            };

            if intent.toggles_busy() {
                store.dispatch(Notification::SetSendingOff);
            }
            outcome
        }
        .instrument(span);

        Settlement {
            intent,
            handle: tokio::spawn(task),
        }
    }
}

fn settle_current_user_id(
    intent: Intent,
    body: Value,
) -> Result<Vec<Notification>, ResponseDecodeError> {
    let response = AccountResponse::from_value(body)?;
    Ok(vec![Notification::SetCurrentUserId {
        current_user_id: response.user_id()?,
        message: Some(intent.success_message()),
    }])
}

fn settle_add_user(intent: Intent, body: Value) -> Result<Vec<Notification>, ResponseDecodeError> {
    let response = AccountResponse::from_value(body)?;
    Ok(vec![Notification::AddUser {
        user: response.into_user(),
        message: intent.success_message(),
    }])
}

fn settle_current_user(
    intent: Intent,
    body: Value,
) -> Result<Vec<Notification>, ResponseDecodeError> {
    let response = AccountResponse::from_value(body)?;
    let current_user_id = response.user_id()?;
    Ok(vec![
        Notification::SetCurrentUserId {
            current_user_id,
            message: None,
        },
        Notification::AddUser {
            user: response.into_user(),
            message: intent.success_message(),
        },
    ])
}

fn settle_user_with_related(
    intent: Intent,
    body: Value,
) -> Result<Vec<Notification>, ResponseDecodeError> {
    let response = AccountResponse::from_value(body)?;
    Ok(vec![Notification::AddUser {
        user: response.into_user_with_related(),
        message: intent.success_message(),
    }])
}

fn settle_reset_current_user_id(
    intent: Intent,
    _body: Value,
) -> Result<Vec<Notification>, ResponseDecodeError> {
    Ok(vec![Notification::ResetCurrentUserId {
        message: intent.success_message(),
    }])
}

fn settle_password_page_inbox(
    intent: Intent,
    _body: Value,
) -> Result<Vec<Notification>, ResponseDecodeError> {
    Ok(vec![Notification::SetPasswordPageState {
        state: PasswordPageState::Inbox,
        message: intent.success_message(),
    }])
}
