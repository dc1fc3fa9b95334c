//! Unified error type for the weather data core.
//!
//! These three classified kinds are the entire failure surface exposed
//! to the chat layer. Cache failures never appear here — the cache
//! degrades to pass-through inside the service boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The provider does not know the location. Permanent, never retried.
    #[error("location not found: {0}")]
    NotFound(String),

    /// Transport failures on every attempt; the retry budget is spent.
    #[error("upstream did not respond after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// The provider answered with an unexpected status.
    #[error("upstream returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Startup-time configuration problem.
    #[error("config error: {0}")]
    Config(String),
}
