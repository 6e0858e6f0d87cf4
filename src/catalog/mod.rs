//! Catalog aggregation pipeline.
//!
//! [`CatalogAssembler`] is the single entry point. It sequences the stages
//! for one request:
//!
//! 1. validate the requested category against the category map (400)
//! 2. fetch and parse the list (upstream/parse failures propagate unchanged)
//! 3. filter by category
//! 4. enrich surviving items with posters (after filtering, so discarded items
//!    are never looked up)
//! 5. sort, unless the aggregate "all" path already fixed the order
//! 6. project items into catalog entries
//!
//! A list-only mode ([`CatalogAssembler::fetch_list`]) stops after
//! enrichment and returns the [`MediaList`] shape.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use catalog_core::catalog::{CatalogAssembler, CatalogRequest, CategoryMap, PosterEnricher};
//! use catalog_core::metadata::MetadataService;
//! use catalog_core::source::{HttpSettings, MdbListClient, TmdbClient, build_http_client};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = build_http_client(HttpSettings::default())?;
//! let metadata = MetadataService::new(
//!     Arc::new(TmdbClient::new(client.clone(), "api-key")),
//!     "https://image.tmdb.org/t/p/w500",
//! );
//! let assembler = CatalogAssembler::new(
//!     Arc::new(MdbListClient::new(client)),
//!     PosterEnricher::with_default_concurrency(metadata),
//! );
//!
//! let categories = CategoryMap::from_entries([("halloween", vec!["halloween", "myers"])])?;
//! let request = CatalogRequest::new("owner", "slasher-movies")
//!     .with_category("halloween")
//!     .with_categories(categories);
//! let catalog = assembler.assemble(&request, &CancellationToken::new()).await?;
//! println!("{} entries", catalog.metas.len());
//! # Ok(())
//! # }
//! ```

mod category;
mod definition;
mod enrich;
mod sort;

pub use category::{
    ALL_CATEGORIES, CategoryMap, CategoryMapError, CategorySelection, FilterMode, FilterOutcome,
    filter_items, normalize_category, select_category,
};
pub use definition::{CatalogDefinition, MISCELLANEOUS_CATEGORY};
pub use enrich::{
    DEFAULT_ENRICH_CONCURRENCY, EnrichStats, EnricherError, MAX_ENRICH_CONCURRENCY, PosterEnricher,
};
pub use sort::{SortKey, sort_items};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::{PipelineError, PipelineResult, cancellable};
use crate::metadata::MetadataService;
use crate::model::{Catalog, ListItem, MediaList};
use crate::parser::parse_list;
use crate::source::ListSource;

/// Everything [`CatalogAssembler::assemble`] needs for one catalog request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogRequest {
    /// Owner of the backing list.
    pub owner: String,
    /// Slug of the backing list.
    pub list: String,
    /// Requested category; blank or absent means no filtering.
    pub category: Option<String>,
    /// Category map the request is validated against.
    pub categories: Option<CategoryMap>,
    /// Ordering to apply after filtering.
    pub sort: Option<SortKey>,
}

impl CatalogRequest {
    /// Creates an unfiltered, unsorted request for `owner/list`.
    #[must_use]
    pub fn new(owner: impl Into<String>, list: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            list: list.into(),
            ..Self::default()
        }
    }

    /// Sets the requested category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the category map.
    #[must_use]
    pub fn with_categories(mut self, categories: CategoryMap) -> Self {
        self.categories = Some(categories);
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Orchestrates list fetch, parse, filter, enrichment, sort and projection.
#[derive(Clone)]
pub struct CatalogAssembler {
    lists: Arc<dyn ListSource>,
    enricher: PosterEnricher,
}

impl CatalogAssembler {
    /// Creates an assembler over a list source and a poster enricher.
    #[must_use]
    pub fn new(lists: Arc<dyn ListSource>, enricher: PosterEnricher) -> Self {
        Self { lists, enricher }
    }

    /// Returns the enricher's metadata service, for standalone lookups.
    #[must_use]
    pub fn metadata(&self) -> &MetadataService {
        self.enricher.metadata()
    }

    /// Builds a catalog for `request`.
    ///
    /// Cancellation during enrichment yields a catalog with whatever posters
    /// were resolved; cancellation while fetching the list is an error.
    ///
    /// # Errors
    ///
    /// - 400 when the requested category is not in the map
    /// - upstream status/body, 404 or 500 from fetching and parsing the list
    /// - [`PipelineError::Cancelled`] when cancelled before the list arrived
    #[instrument(
        skip_all,
        fields(owner = %request.owner, list = %request.list, category = ?request.category)
    )]
    pub async fn assemble(
        &self,
        request: &CatalogRequest,
        cancel: &CancellationToken,
    ) -> PipelineResult<Catalog> {
        let requested = request.category.as_deref();
        let categories = request.categories.as_ref();
        // Unknown categories fail before the upstream is contacted.
        select_category(requested, categories)?;

        let items = self.fetch_items(&request.owner, &request.list, cancel).await?;
        let FilterOutcome { mut items, mode } = filter_items(items, requested, categories)?;

        self.enricher.enrich(&mut items, cancel).await;

        match request.sort {
            Some(key) if !mode.skips_sorting() => sort_items(&mut items, key),
            Some(key) => debug!(sort = %key, "aggregate ordering kept; sort skipped"),
            None => {}
        }

        let catalog = Catalog {
            metas: items.iter().map(ListItem::to_catalog_item).collect(),
        };
        info!(entries = catalog.metas.len(), "catalog assembled");
        Ok(catalog)
    }

    /// Fetches and parses `owner/name`, optionally enriching posters.
    ///
    /// No filtering, sorting or projection is applied.
    ///
    /// # Errors
    ///
    /// Same list-stage failures as [`CatalogAssembler::assemble`].
    #[instrument(skip(self, cancel))]
    pub async fn fetch_list(
        &self,
        owner: &str,
        name: &str,
        with_posters: bool,
        cancel: &CancellationToken,
    ) -> PipelineResult<MediaList> {
        let mut items = self.fetch_items(owner, name, cancel).await?;
        if with_posters {
            self.enricher.enrich(&mut items, cancel).await;
        }
        info!(items = items.len(), "list fetched");
        Ok(MediaList {
            owner: owner.to_string(),
            name: name.to_string(),
            items,
        })
    }

    async fn fetch_items(
        &self,
        owner: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> PipelineResult<Vec<ListItem>> {
        let response = cancellable(cancel, async {
            self.lists
                .fetch_list(owner, name)
                .await
                .map_err(PipelineError::from)
        })
        .await?;

        let body = response.into_success_body().inspect_err(|error| {
            warn!(status = error.status_code(), "list source returned an error");
        })?;
        parse_list(&body)
    }
}

impl std::fmt::Debug for CatalogAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogAssembler")
            .field("enricher", &self.enricher)
            .finish_non_exhaustive()
    }
}
