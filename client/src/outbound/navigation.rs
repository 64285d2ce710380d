//! Navigation adapter for headless callers.
//!
//! Outside a browser there is no page to replace, so the forced navigation is
//! resolved to an absolute URL and recorded through `tracing`.

use reqwest::Url;
use tracing::{info, warn};

use crate::domain::Destination;
use crate::domain::ports::Navigator;

/// [`Navigator`] that logs the page a browser would have loaded.
#[derive(Debug, Clone)]
pub struct TracingNavigator {
    origin: Url,
}

impl TracingNavigator {
    /// Resolve destinations against `origin`.
    #[must_use]
    pub const fn new(origin: Url) -> Self {
        Self { origin }
    }

    /// Absolute URL for `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error when the origin cannot be a base URL.
    pub fn resolve(&self, destination: Destination) -> Result<Url, url::ParseError> {
        self.origin.join(destination.path())
    }
}

impl Navigator for TracingNavigator {
    fn force_navigation(&self, destination: Destination) {
        match self.resolve(destination) {
            Ok(url) => info!(%url, "full page navigation requested"),
            Err(error) => warn!(%destination, %error, "navigation destination did not resolve"),
        }
    }
}
