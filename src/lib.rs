//! Media Catalog Core Library
//!
//! This library turns curated public media lists into browsable catalogs:
//! it fetches a list from MDBList, filters it by named category, enriches
//! entries with TMDB posters under a concurrency limit, orders the result
//! and projects it into catalog entries.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`source`] - Upstream adapters (MDBList, TMDB) behind traits
//! - [`parser`] - List payload parsing
//! - [`metadata`] - Poster and details lookups
//! - [`catalog`] - Category filtering, enrichment, sorting and assembly
//! - [`config`] - TOML configuration and catalog definitions
//! - [`error`] - Status-carrying pipeline errors and outcomes

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod metadata;
pub mod model;
pub mod parser;
pub mod source;
mod user_agent;

// Re-export commonly used types
pub use catalog::{
    CatalogAssembler, CatalogDefinition, CatalogRequest, CategoryMap, PosterEnricher, SortKey,
};
pub use config::{AppConfig, ConfigError, LoadedConfig};
pub use error::{PipelineError, PipelineOutcome, PipelineResult, cancellable};
pub use metadata::{MediaDetails, MetadataService};
pub use model::{Catalog, CatalogItem, ListItem, MediaList, Poster};
pub use parser::parse_list;
pub use source::{ExternalSource, ListSource, MetadataSource, RawResponse};
