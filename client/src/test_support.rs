//! Test utilities for the client crate.
//!
//! These recording doubles are shared by unit tests (in `src/`) and
//! integration tests (in `tests/`). They are compiled for tests and behind
//! the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::domain::ports::{Navigator, Store, Transport, TransportRejection, TransportRequest};
use crate::domain::{Destination, Notification};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One side effect observed by a [`Journal`].
#[derive(Debug, Clone, PartialEq)]
pub enum JournalEntry {
    /// A notification reached the store.
    Notification(Notification),
    /// A forced navigation was requested.
    Navigation(Destination),
}

/// Ordered record of store dispatches and navigations.
///
/// The store and navigator doubles built from one journal share it, so tests
/// can assert the relative order of notifications and navigation.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl Journal {
    /// Store double writing into this journal.
    #[must_use]
    pub fn store(&self) -> RecordingStore {
        RecordingStore {
            journal: self.clone(),
        }
    }

    /// Navigator double writing into this journal.
    #[must_use]
    pub fn navigator(&self) -> RecordingNavigator {
        RecordingNavigator {
            journal: self.clone(),
        }
    }

    /// Every entry recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<JournalEntry> {
        lock(&self.entries).clone()
    }

    /// Notifications only, in dispatch order.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                JournalEntry::Notification(notification) => Some(notification),
                JournalEntry::Navigation(_) => None,
            })
            .collect()
    }

    /// Notification tags only, in dispatch order.
    #[must_use]
    pub fn tags(&self) -> Vec<&'static str> {
        self.notifications().iter().map(Notification::tag).collect()
    }

    /// Navigations only, in request order.
    #[must_use]
    pub fn navigations(&self) -> Vec<Destination> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                JournalEntry::Navigation(destination) => Some(destination),
                JournalEntry::Notification(_) => None,
            })
            .collect()
    }

    fn push(&self, entry: JournalEntry) {
        lock(&self.entries).push(entry);
    }
}

/// [`Store`] double recording into a [`Journal`].
#[derive(Debug, Clone)]
pub struct RecordingStore {
    journal: Journal,
}

impl Store for RecordingStore {
    fn dispatch(&self, notification: Notification) {
        self.journal.push(JournalEntry::Notification(notification));
    }
}

/// [`Navigator`] double recording into a [`Journal`].
#[derive(Debug, Clone)]
pub struct RecordingNavigator {
    journal: Journal,
}

impl Navigator for RecordingNavigator {
    fn force_navigation(&self, destination: Destination) {
        self.journal.push(JournalEntry::Navigation(destination));
    }
}

/// Configured settlement for one [`ScriptedTransport`] call.
pub type TransportResponse = Result<Value, TransportRejection>;

/// [`Transport`] double that records requests and answers each with the same
/// scripted response.
///
/// A gated transport holds each call until [`Self::release`] adds a permit,
/// which keeps requests in flight for as long as a test needs.
#[derive(Clone)]
pub struct ScriptedTransport {
    calls: Arc<Mutex<Vec<TransportRequest>>>,
    response: TransportResponse,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedTransport {
    /// Transport answering every call with `response`.
    #[must_use]
    pub fn new(response: TransportResponse) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            response,
            gate: None,
        }
    }

    /// Transport resolving every call with `body`.
    #[must_use]
    pub fn resolving(body: Value) -> Self {
        Self::new(Ok(body))
    }

    /// Transport rejecting every call with `payload`.
    #[must_use]
    pub fn rejecting(payload: Value) -> Self {
        Self::new(Err(TransportRejection::new(payload)))
    }

    /// Hold every call until a permit is released.
    #[must_use]
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let `count` held calls proceed.
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// Requests received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<TransportRequest> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(&self, request: TransportRequest) -> Result<Value, TransportRejection> {
        lock(&self.calls).push(request);
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        self.response.clone()
    }
}
