//! Domain types and the account action coordinator.
//!
//! Purpose: describe the notifications the store folds into state, the
//! per-intent protocol table, and the coordinator that sequences them around
//! one transport call. Nothing here performs I/O directly; every side effect
//! goes through a port in [`ports`].
//!
//! Public surface:
//! - AccountActions — the coordinator; one operation per intent.
//! - AccountCommand — an intent plus its arguments.
//! - Intent — fixed per-intent table (method, messages, busy, destination).
//! - Notification — immutable record handed to the store.
//! - UserId, UserRecord, Payload — request and response data.

pub mod account_actions;
pub mod account_response;
pub mod intent;
pub mod notification;
pub mod ports;
pub mod user;

pub use self::account_actions::{AccountActions, AccountCommand, Outcome, Settlement};
pub use self::account_response::{AccountResponse, RELATED_COLLECTIONS, ResponseDecodeError};
pub use self::intent::{Destination, Intent};
pub use self::notification::{Notification, PasswordPageState};
pub use self::user::{Payload, UserId, UserRecord};
