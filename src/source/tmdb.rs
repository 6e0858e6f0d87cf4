//! TMDB adapter - resolves external identifiers through the find endpoint.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{ExternalSource, MetadataSource, RawResponse, SourceError};

/// Default TMDB API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

const SERVICE: &str = "tmdb";

/// Calls `GET {base}/find/{id}?api_key=...&external_source=...`.
///
/// The API key only ever appears in the outgoing query string; it is excluded
/// from `Debug` output, log fields and error messages.
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Creates a client against the public TMDB API.
    #[must_use]
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL, api_key)
    }

    /// Creates a client with a custom base URL (configuration or wiremock).
    #[must_use]
    pub fn with_base_url(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }

    fn find_path(external_id: &str) -> String {
        format!("/find/{}", urlencoding::encode(external_id))
    }
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url)
            .field("api_key_set", &!self.api_key.is_empty())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MetadataSource for TmdbClient {
    #[tracing::instrument(skip(self), fields(service = SERVICE, external_source = %external_source))]
    async fn fetch_details(
        &self,
        external_id: &str,
        external_source: ExternalSource,
    ) -> Result<RawResponse, SourceError> {
        let endpoint = Self::find_path(external_id);
        let url = format!(
            "{}{}?api_key={}&external_source={}",
            self.base_url,
            endpoint,
            urlencoding::encode(&self.api_key),
            external_source.as_str()
        );
        debug!(endpoint = %endpoint, "Calling TMDB find API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| {
                let source = source.without_url();
                warn!(error = %source, "TMDB request failed");
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
            source: source.without_url(),
        })?;

        debug!(status, body_len = body.len(), "TMDB responded");
        Ok(RawResponse::new(status, body))
    }
}
