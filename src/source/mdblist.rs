//! MDBList adapter - fetches curated lists as raw JSON.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{ListSource, RawResponse, SourceError};

/// Default MDBList API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.mdblist.com";

const SERVICE: &str = "mdblist";

/// Fetches `GET {base}/lists/{owner}/{name}/json` from MDBList.
#[derive(Clone)]
pub struct MdbListClient {
    client: Client,
    base_url: String,
}

impl MdbListClient {
    /// Creates a client against the public MDBList API.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (configuration or wiremock).
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn list_path(owner: &str, name: &str) -> String {
        format!(
            "/lists/{}/{}/json",
            urlencoding::encode(owner),
            urlencoding::encode(name)
        )
    }
}

impl std::fmt::Debug for MdbListClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MdbListClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ListSource for MdbListClient {
    #[tracing::instrument(skip(self), fields(service = SERVICE))]
    async fn fetch_list(&self, owner: &str, name: &str) -> Result<RawResponse, SourceError> {
        let endpoint = Self::list_path(owner, name);
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "Calling MDBList API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| {
                warn!(error = %source, "MDBList request failed");
                SourceError::Request {
                    service: SERVICE,
                    endpoint: endpoint.clone(),
                    source,
                }
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|source| SourceError::Body {
            service: SERVICE,
            endpoint,
            source,
        })?;

        debug!(status, body_len = body.len(), "MDBList responded");
        Ok(RawResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_path_encodes_segments() {
        assert_eq!(
            MdbListClient::list_path("slander2328", "slasher-movies"),
            "/lists/slander2328/slasher-movies/json"
        );
        assert_eq!(
            MdbListClient::list_path("a b", "x/y"),
            "/lists/a%20b/x%2Fy/json"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = MdbListClient::with_base_url(Client::new(), "http://localhost:1234/");
        assert_eq!(client.base_url, "http://localhost:1234");
    }
}
