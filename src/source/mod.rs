//! Upstream adapters for the list-hosting and metadata services.
//!
//! Adapters issue exactly one request per call and hand back the raw status
//! and body. They never interpret payloads and never retry; interpretation
//! belongs to the parser and metadata layers.
//!
//! # Architecture
//!
//! - [`ListSource`] - fetches one curated list by owner and name
//! - [`MetadataSource`] - looks up one external identifier
//! - [`MdbListClient`] / [`TmdbClient`] - `reqwest` implementations
//! - [`build_http_client`] - shared client construction policy

mod error;
mod http_client;
mod mdblist;
mod tmdb;

pub use error::SourceError;
pub use http_client::{HttpSettings, build_http_client};
pub use mdblist::{DEFAULT_BASE_URL as DEFAULT_MDBLIST_BASE_URL, MdbListClient};
pub use tmdb::{DEFAULT_BASE_URL as DEFAULT_TMDB_BASE_URL, TmdbClient};

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::error::PipelineError;

/// Status and body of an upstream response, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status returned by the upstream.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Creates a raw response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body on success, or the upstream failure carrying status and body.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Upstream`] for any non-2xx status.
    pub fn into_success_body(self) -> Result<String, PipelineError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(PipelineError::upstream(self.status, self.body))
        }
    }
}

/// External identifier namespaces accepted by the metadata service's find endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExternalSource {
    /// IMDb title identifiers (`tt...`).
    #[default]
    Imdb,
    /// Facebook page identifiers.
    Facebook,
    /// Instagram handles.
    Instagram,
    /// TheTVDB identifiers.
    Tvdb,
    /// TikTok handles.
    Tiktok,
    /// Twitter handles.
    Twitter,
    /// Wikidata entity identifiers.
    Wikidata,
    /// YouTube channel identifiers.
    Youtube,
}

impl ExternalSource {
    /// All supported sources, in documentation order.
    pub const ALL: [Self; 8] = [
        Self::Imdb,
        Self::Facebook,
        Self::Instagram,
        Self::Tvdb,
        Self::Tiktok,
        Self::Twitter,
        Self::Wikidata,
        Self::Youtube,
    ];

    /// Returns the query-parameter value the metadata API expects.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Imdb => "imdb_id",
            Self::Facebook => "facebook_id",
            Self::Instagram => "instagram_id",
            Self::Tvdb => "tvdb_id",
            Self::Tiktok => "tiktok_id",
            Self::Twitter => "twitter_id",
            Self::Wikidata => "wikidata_id",
            Self::Youtube => "youtube_id",
        }
    }
}

impl fmt::Display for ExternalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExternalSource {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == normalized)
            .ok_or_else(|| {
                PipelineError::invalid_input(format!("Invalid external source: {value}"))
            })
    }
}

/// Fetches curated lists from the list-hosting service.
///
/// Uses `async_trait` so the assembler can hold `Arc<dyn ListSource>` and tests
/// can substitute in-memory sources.
#[async_trait]
pub trait ListSource: Send + Sync {
    /// Issues one request for the list `owner/name`.
    async fn fetch_list(&self, owner: &str, name: &str) -> Result<RawResponse, SourceError>;
}

/// Resolves external identifiers against the metadata service.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Issues one find request for `external_id` in the given namespace.
    async fn fetch_details(
        &self,
        external_id: &str,
        external_source: ExternalSource,
    ) -> Result<RawResponse, SourceError>;
}
