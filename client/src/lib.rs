//! Account action coordination for the client.
//!
//! The [`domain::AccountActions`] coordinator turns user-account intents into
//! store notifications and exactly one HTTP request each. Collaborators are
//! injected through the ports in [`domain::ports`]; [`outbound`] provides the
//! reqwest transport and the channel-backed store used outside tests.

pub mod domain;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use domain::{AccountActions, AccountCommand, Notification, Outcome, Settlement};
pub use settings::ClientSettings;
