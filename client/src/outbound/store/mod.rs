//! Store adapters.
//!
//! The application store lives outside this crate; these adapters hand
//! notifications to whatever owns it.

mod channel;

pub use channel::ChannelStore;
