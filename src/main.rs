//! CLI entry point for the media-catalog tool.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use catalog_core::{
    AppConfig, CatalogDefinition, PipelineError, PipelineOutcome, PipelineResult, cancellable,
};
use clap::Parser;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let loaded = AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    debug!(
        path = ?loaded.path,
        from_file = loaded.loaded_from_file,
        catalogs = loaded.config.catalogs.len(),
        "configuration resolved"
    );
    let config = loaded.config;

    if config.tmdb.api_key.is_empty() && args.command != Command::Catalogs {
        warn!("no TMDB API key configured; poster and details lookups will fail");
    }

    let assembler = config
        .build_assembler()
        .context("failed to initialize upstream clients")?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    match args.command {
        Command::Catalog {
            catalog_id,
            category,
            sort,
        } => {
            let result = match config.catalog(&catalog_id) {
                Some(definition) => {
                    info!(catalog = %definition.id, "building catalog");
                    let request = definition.request(category.as_deref(), sort);
                    assembler.assemble(&request, &cancel).await
                }
                None => Err(PipelineError::not_found(format!(
                    "Unknown catalog: {catalog_id}"
                ))),
            };
            emit(result)
        }
        Command::List {
            owner,
            name,
            no_posters,
        } => emit(
            assembler
                .fetch_list(&owner, &name, !no_posters, &cancel)
                .await,
        ),
        Command::Poster { imdb_id } => {
            emit(cancellable(&cancel, assembler.metadata().poster(&imdb_id)).await)
        }
        Command::Details { id, source } => {
            emit(cancellable(&cancel, assembler.metadata().details(&id, source)).await)
        }
        Command::Catalogs => {
            let summaries: Vec<_> = config.catalogs.iter().map(CatalogSummary::from).collect();
            emit(Ok(summaries))
        }
    }
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; cancelling outstanding requests");
            cancel.cancel();
        }
    });
}

/// Prints the value on success, or the outcome envelope on failure.
///
/// Exit code is 0 on success, 2 for client-class failures, 1 otherwise.
fn emit<T: Serialize>(result: PipelineResult<T>) -> Result<ExitCode> {
    let code = match &result {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) if error.is_client_error() => ExitCode::from(2),
        Err(_) => ExitCode::from(1),
    };

    let json = match result {
        Ok(value) => serde_json::to_string_pretty(&value),
        Err(error) => {
            warn!(status = error.status_code(), %error, "request failed");
            serde_json::to_string_pretty(&PipelineOutcome::<T>::from(Err(error)))
        }
    }
    .context("failed to serialize output")?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").context("failed to write output")?;
    Ok(code)
}

#[derive(Debug, Serialize)]
struct CatalogSummary<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    media_type: &'a str,
    owner: &'a str,
    list: &'a str,
    categories: Vec<String>,
}

impl<'a> From<&'a CatalogDefinition> for CatalogSummary<'a> {
    fn from(definition: &'a CatalogDefinition) -> Self {
        Self {
            id: &definition.id,
            name: &definition.name,
            media_type: &definition.media_type,
            owner: &definition.owner,
            list: &definition.list,
            categories: definition.category_options(),
        }
    }
}
