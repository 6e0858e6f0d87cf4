//! Metadata lookups layered over a [`MetadataSource`].
//!
//! [`MetadataService`] interprets raw find responses into
//! [`MediaDetails`] and [`Poster`] values, mapping every failure into a
//! [`PipelineError`] with the appropriate status classifier.

mod details;

pub use details::{MediaDetails, MovieDetails, TvDetails};

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{PipelineError, PipelineResult};
use crate::model::Poster;
use crate::source::{ExternalSource, MetadataSource};

use details::FindResponse;

/// Default base URL poster paths are appended to.
pub const DEFAULT_POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Resolves details and posters for external identifiers.
#[derive(Clone)]
pub struct MetadataService {
    source: Arc<dyn MetadataSource>,
    poster_base_url: String,
}

impl MetadataService {
    /// Creates a service over `source`, prefixing poster paths with `poster_base_url`.
    #[must_use]
    pub fn new(source: Arc<dyn MetadataSource>, poster_base_url: impl Into<String>) -> Self {
        Self {
            source,
            poster_base_url: poster_base_url.into(),
        }
    }

    /// Returns the configured poster base URL.
    #[must_use]
    pub fn poster_base_url(&self) -> &str {
        &self.poster_base_url
    }

    /// Looks up details for `external_id`: first movie result, else first TV result.
    ///
    /// # Errors
    ///
    /// - upstream status and body for a non-success response
    /// - 404 when neither result array has an entry
    /// - 500 when the body cannot be parsed or the request fails
    #[instrument(skip(self), fields(external_source = %external_source))]
    pub async fn details(
        &self,
        external_id: &str,
        external_source: ExternalSource,
    ) -> PipelineResult<MediaDetails> {
        let response = self.find(external_id, external_source).await?;
        response.into_first_details().ok_or_else(|| {
            PipelineError::not_found(format!("No TMDB details found for IMDB ID {external_id}"))
        })
    }

    /// Resolves the poster URL for an IMDb identifier.
    ///
    /// Takes the first non-empty `poster_path` of the first movie result, then
    /// of the first TV result, and prefixes it with the poster base URL.
    ///
    /// # Errors
    ///
    /// Same as [`MetadataService::details`]; 404 when no poster path exists.
    #[instrument(skip(self))]
    pub async fn poster(&self, imdb_id: &str) -> PipelineResult<Poster> {
        let response = self.find(imdb_id, ExternalSource::Imdb).await?;
        let Some(path) = response.first_poster_path() else {
            debug!("no poster path in find response");
            return Err(PipelineError::not_found(format!(
                "Poster not found for IMDB ID {imdb_id}"
            )));
        };
        Ok(Poster {
            imdb_id: imdb_id.to_string(),
            poster_path: format!("{}{}", self.poster_base_url, path),
        })
    }

    async fn find(
        &self,
        external_id: &str,
        external_source: ExternalSource,
    ) -> PipelineResult<FindResponse> {
        let body = self
            .source
            .fetch_details(external_id, external_source)
            .await?
            .into_success_body()?;
        serde_json::from_str(&body).map_err(|e| {
            PipelineError::malformed(format!("Failed to deserialize TMDB JSON: {e}"))
        })
    }
}

impl std::fmt::Debug for MetadataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataService")
            .field("poster_base_url", &self.poster_base_url)
            .finish_non_exhaustive()
    }
}
