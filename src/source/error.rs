//! Error types for upstream adapters.

use thiserror::Error;

use crate::error::PipelineError;

/// Transport-level failures raised before an upstream status is available.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("request to {service} {endpoint} failed: {source}")]
    Request {
        /// Upstream service name ("mdblist", "tmdb").
        service: &'static str,
        /// Request path, without query string.
        endpoint: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be read.
    #[error("reading {service} response body for {endpoint} failed: {source}")]
    Body {
        /// Upstream service name.
        service: &'static str,
        /// Request path, without query string.
        endpoint: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The shared HTTP client could not be constructed.
    #[error("HTTP client construction failed: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl SourceError {
    /// Returns true when the failure was a client-side timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Request { source, .. } | Self::Body { source, .. } => source.is_timeout(),
            Self::ClientBuild(_) => false,
        }
    }
}

impl From<SourceError> for PipelineError {
    fn from(error: SourceError) -> Self {
        Self::transport(error.to_string())
    }
}
