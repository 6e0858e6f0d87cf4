//! Shared HTTP client construction policy for upstream adapters.
//!
//! Both adapters share one `reqwest::Client` so timeouts, user-agent and
//! compression stay consistent and connections are pooled across lookups.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::user_agent;

use super::SourceError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Timeouts applied to every upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
        }
    }
}

/// Builds the upstream HTTP client using shared project policy.
///
/// # Errors
///
/// Returns [`SourceError::ClientBuild`] when client construction fails.
pub fn build_http_client(settings: HttpSettings) -> Result<Client, SourceError> {
    debug!(
        connect_timeout_secs = settings.connect_timeout_secs,
        read_timeout_secs = settings.read_timeout_secs,
        "building upstream HTTP client"
    );
    Client::builder()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .timeout(Duration::from_secs(settings.read_timeout_secs))
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
        .build()
        .map_err(SourceError::ClientBuild)
}
