//! Bounded-concurrency poster enrichment.
//!
//! The [`PosterEnricher`] issues one poster lookup per eligible list item,
//! with at most `concurrency` lookups outstanding at any time. Each lookup
//! owns a disjoint `&mut ListItem`, so results are written back without
//! locking.
//!
//! # Concurrency Model
//!
//! - Per-item lookup futures are driven together with `join_all` on the caller's task
//! - A semaphore permit is acquired before each lookup starts
//! - Permits are released automatically when a lookup finishes, fails or is cancelled (RAII)
//! - Every await races the cancellation token
//!
//! # Failure Behavior
//!
//! Posters are cosmetic. A failed lookup (upstream error, missing poster,
//! malformed payload) leaves the item's poster untouched and is only counted
//! in [`EnrichStats`]; the batch itself never fails.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::metadata::MetadataService;
use crate::model::ListItem;

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_ENRICH_CONCURRENCY: usize = 50;

/// Default number of simultaneous poster lookups.
pub const DEFAULT_ENRICH_CONCURRENCY: usize = 5;

/// Error type for enricher construction.
#[derive(Debug, thiserror::Error)]
pub enum EnricherError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid enrichment concurrency {value}: must be between {MIN_CONCURRENCY} and {MAX_ENRICH_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// Counters from one [`PosterEnricher::enrich`] call.
#[derive(Debug, Default)]
pub struct EnrichStats {
    enriched: AtomicUsize,
    missing: AtomicUsize,
    skipped: AtomicUsize,
    cancelled: AtomicUsize,
}

impl EnrichStats {
    /// Creates a stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items whose poster was set by a successful lookup.
    #[must_use]
    pub fn enriched(&self) -> usize {
        self.enriched.load(Ordering::SeqCst)
    }

    /// Items whose lookup failed or returned no poster.
    #[must_use]
    pub fn missing(&self) -> usize {
        self.missing.load(Ordering::SeqCst)
    }

    /// Items not eligible for lookup (identifier missing or not `tt`-prefixed).
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Lookups abandoned because the cancellation token fired.
    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Number of lookups scheduled (everything not skipped).
    #[must_use]
    pub fn scheduled(&self) -> usize {
        self.enriched() + self.missing() + self.cancelled()
    }

    fn increment_enriched(&self) {
        self.enriched.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_missing(&self) {
        self.missing.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::SeqCst);
    }
}

/// Writes poster URLs onto list items through a bounded fan-out.
#[derive(Debug, Clone)]
pub struct PosterEnricher {
    metadata: MetadataService,
    concurrency: usize,
}

impl PosterEnricher {
    /// Creates an enricher allowing `concurrency` simultaneous lookups.
    ///
    /// # Errors
    ///
    /// Returns [`EnricherError::InvalidConcurrency`] outside 1..=50.
    pub fn new(metadata: MetadataService, concurrency: usize) -> Result<Self, EnricherError> {
        if !(MIN_CONCURRENCY..=MAX_ENRICH_CONCURRENCY).contains(&concurrency) {
            return Err(EnricherError::InvalidConcurrency { value: concurrency });
        }
        Ok(Self {
            metadata,
            concurrency,
        })
    }

    /// Creates an enricher with [`DEFAULT_ENRICH_CONCURRENCY`].
    #[must_use]
    pub fn with_default_concurrency(metadata: MetadataService) -> Self {
        Self {
            metadata,
            concurrency: DEFAULT_ENRICH_CONCURRENCY,
        }
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the metadata service lookups go through.
    #[must_use]
    pub fn metadata(&self) -> &MetadataService {
        &self.metadata
    }

    /// Resolves posters for every `tt`-prefixed item, in place.
    ///
    /// Returns once every scheduled lookup has completed or been cancelled.
    /// Partial enrichment after cancellation is expected, not an error.
    #[instrument(skip_all, fields(items = items.len(), concurrency = self.concurrency))]
    pub async fn enrich(&self, items: &mut [ListItem], cancel: &CancellationToken) -> EnrichStats {
        let stats = EnrichStats::new();
        let semaphore = Semaphore::new(self.concurrency);

        let lookups = items.iter_mut().filter_map(|item| {
            let Some(id) = item.enrichable_id().map(str::to_string) else {
                stats.increment_skipped();
                return None;
            };
            Some(self.enrich_one(id, item, &semaphore, &stats, cancel))
        });
        join_all(lookups).await;

        info!(
            enriched = stats.enriched(),
            missing = stats.missing(),
            skipped = stats.skipped(),
            cancelled = stats.cancelled(),
            "poster enrichment finished"
        );
        stats
    }

    async fn enrich_one(
        &self,
        id: String,
        item: &mut ListItem,
        semaphore: &Semaphore,
        stats: &EnrichStats,
        cancel: &CancellationToken,
    ) {
        let lookup = async {
            // Permit is dropped when this block exits (RAII)
            let Ok(_permit) = semaphore.acquire().await else {
                return None;
            };
            Some(self.metadata.poster(&id).await)
        };

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            result = lookup => result,
        };

        match outcome {
            Some(Ok(poster)) => {
                debug!(imdb_id = %id, poster = %poster.poster_path, "poster resolved");
                item.poster = Some(poster.poster_path);
                stats.increment_enriched();
            }
            Some(Err(error)) => {
                debug!(
                    imdb_id = %id,
                    status = error.status_code(),
                    error = %error,
                    "poster lookup failed; keeping item as-is"
                );
                stats.increment_missing();
            }
            None => {
                debug!(imdb_id = %id, "poster lookup cancelled");
                stats.increment_cancelled();
            }
        }
    }
}
