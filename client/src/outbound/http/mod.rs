//! HTTP outbound adapters.
//!
//! This module provides the reqwest implementation of the `Transport` port.

mod transport;

pub use transport::{HttpTransport, HttpTransportBuildError};
