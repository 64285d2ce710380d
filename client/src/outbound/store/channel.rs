//! Channel-backed store adapter.
//!
//! Notifications are pushed onto an unbounded Tokio channel so the owner of
//! the application state can fold them on its own loop. Dispatch never
//! blocks; a closed receiver drops the notification with a warning.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::warn;

use crate::domain::Notification;
use crate::domain::ports::Store;

/// [`Store`] adapter forwarding notifications over a channel.
///
/// # Examples
/// ```
/// use client::domain::Notification;
/// use client::domain::ports::Store;
/// use client::outbound::store::ChannelStore;
///
/// let (store, mut receiver) = ChannelStore::new();
/// store.dispatch(Notification::SetSendingOn);
/// assert_eq!(receiver.try_recv().ok(), Some(Notification::SetSendingOn));
/// ```
#[derive(Debug, Clone)]
pub struct ChannelStore {
    sender: UnboundedSender<Notification>,
}

impl ChannelStore {
    /// Create a store and the receiver its notifications arrive on.
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<Notification>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Store for ChannelStore {
    fn dispatch(&self, notification: Notification) {
        if let Err(error) = self.sender.send(notification) {
            warn!(tag = error.0.tag(), "store receiver closed; notification dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn delivers_notifications_in_dispatch_order() {
        let (store, mut receiver) = ChannelStore::new();
        store.dispatch(Notification::SetSendingOn);
        store.dispatch(Notification::LogOutUser);

        assert_eq!(receiver.try_recv().ok(), Some(Notification::SetSendingOn));
        assert_eq!(receiver.try_recv().ok(), Some(Notification::LogOutUser));
        assert!(receiver.try_recv().is_err());
    }

    #[rstest]
    fn closed_receiver_does_not_panic() {
        let (store, receiver) = ChannelStore::new();
        drop(receiver);
        store.dispatch(Notification::SetSendingOff);
    }
}
