//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use catalog_core::{ExternalSource, SortKey};

/// Build browsable media catalogs from curated public lists.
///
/// Media-catalog fetches a curated list, filters it by category, adds
/// poster artwork and prints the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "media-catalog")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file (defaults to the XDG config location)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build a configured catalog, optionally narrowed to one category
    Catalog {
        /// Catalog id (see `catalogs`)
        catalog_id: String,

        /// Category key, or "all" for every category in map order
        category: Option<String>,

        /// Override the catalog's default ordering
        #[arg(long, value_parser = parse_sort_key)]
        sort: Option<SortKey>,
    },

    /// Fetch a raw list by owner and name
    List {
        /// List owner
        owner: String,

        /// List slug
        name: String,

        /// Skip poster enrichment
        #[arg(long)]
        no_posters: bool,
    },

    /// Look up the poster for an IMDb id
    Poster {
        /// IMDb id (e.g. tt0077651)
        imdb_id: String,
    },

    /// Look up movie or TV details for an external id
    Details {
        /// External identifier
        id: String,

        /// Namespace of the identifier
        #[arg(long, default_value_t = ExternalSource::Imdb, value_parser = parse_external_source)]
        source: ExternalSource,
    },

    /// List configured catalogs and their categories
    Catalogs,
}

fn parse_sort_key(value: &str) -> Result<SortKey, String> {
    value.parse::<SortKey>().map_err(|e| e.to_string())
}

fn parse_external_source(value: &str) -> Result<ExternalSource, String> {
    value.parse::<ExternalSource>().map_err(|e| e.to_string())
}
