//! Application configuration: upstream endpoints, HTTP policy, enrichment
//! limits and catalog definitions.
//!
//! Configuration is read from a TOML file. Every field is optional; missing
//! values fall back to the public MDBList/TMDB endpoints and the built-in
//! catalog set. `TMDB_API_KEY` overrides the file's API key.
//!
//! ```toml
//! [tmdb]
//! api_key = "..."
//!
//! [enrichment]
//! concurrency = 5
//!
//! [[catalogs]]
//! id = "slasher"
//! name = "Slasher Films"
//! owner = "slander2328"
//! list = "slasher-movies"
//!
//! [[catalogs.categories]]
//! key = "halloween"
//! matches = ["halloween", "myers"]
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::{
    CatalogAssembler, CatalogDefinition, CategoryMap, CategoryMapError, DEFAULT_ENRICH_CONCURRENCY,
    EnricherError, MAX_ENRICH_CONCURRENCY, PosterEnricher,
};
use crate::metadata::{DEFAULT_POSTER_BASE_URL, MetadataService};
use crate::model::DEFAULT_CATALOG_TYPE;
use crate::source::{
    DEFAULT_MDBLIST_BASE_URL, DEFAULT_TMDB_BASE_URL, HttpSettings, MdbListClient, SourceError,
    TmdbClient, build_http_client,
};

/// Environment variable overriding the TMDB API key.
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

const CONFIG_DIR_NAME: &str = "media-catalog";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_CATALOGS_TOML: &str = include_str!("default_catalogs.toml");

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is outside its allowed range or format.
    #[error("invalid config value for `{field}`: {message}")]
    Invalid {
        /// Dotted field name.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A catalog's category map is invalid.
    #[error("invalid categories for catalog '{catalog}': {source}")]
    Categories {
        /// Catalog id.
        catalog: String,
        /// Underlying category map error.
        #[source]
        source: CategoryMapError,
    },

    /// Two catalogs share an id.
    #[error("duplicate catalog id '{0}'")]
    DuplicateCatalog(String),

    /// The HTTP client could not be built.
    #[error(transparent)]
    HttpClient(#[from] SourceError),

    /// The enricher rejected its settings.
    #[error(transparent)]
    Enricher(#[from] EnricherError),
}

/// TMDB endpoint and credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct TmdbSettings {
    /// API base URL.
    pub base_url: String,
    /// API key sent with every find request.
    pub api_key: String,
    /// Prefix for poster paths.
    pub poster_base_url: String,
}

impl Default for TmdbSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            api_key: String::new(),
            poster_base_url: DEFAULT_POSTER_BASE_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for TmdbSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbSettings")
            .field("base_url", &self.base_url)
            .field("api_key_set", &!self.api_key.is_empty())
            .field("poster_base_url", &self.poster_base_url)
            .finish()
    }
}

/// Fully resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// MDBList API base URL.
    pub mdblist_base_url: String,
    /// TMDB settings.
    pub tmdb: TmdbSettings,
    /// Upstream HTTP timeouts.
    pub http: HttpSettings,
    /// Simultaneous poster lookups per request.
    pub enrich_concurrency: usize,
    /// Catalog definitions in file order.
    pub catalogs: Vec<CatalogDefinition>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mdblist_base_url: DEFAULT_MDBLIST_BASE_URL.to_string(),
            tmdb: TmdbSettings::default(),
            http: HttpSettings::default(),
            enrich_concurrency: DEFAULT_ENRICH_CONCURRENCY,
            catalogs: Vec::new(),
        }
    }
}

/// Config plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Path consulted, if one could be resolved.
    pub path: Option<PathBuf>,
    /// Whether a file was actually read.
    pub loaded_from_file: bool,
    /// The resolved configuration.
    pub config: AppConfig,
}

// ==================== File schema ====================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    mdblist: MdbListSection,
    tmdb: TmdbSection,
    http: HttpSection,
    enrichment: EnrichmentSection,
    catalogs: Vec<CatalogSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MdbListSection {
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TmdbSection {
    base_url: Option<String>,
    api_key: Option<String>,
    poster_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct HttpSection {
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EnrichmentSection {
    concurrency: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogSection {
    id: String,
    name: Option<String>,
    #[serde(rename = "type")]
    media_type: Option<String>,
    owner: String,
    list: String,
    #[serde(default)]
    categories: Vec<CategorySection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategorySection {
    key: String,
    matches: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogsOnly {
    catalogs: Vec<CatalogSection>,
}

// ==================== Loading ====================

impl AppConfig {
    /// Parses configuration from TOML text and validates it.
    ///
    /// Built-in catalogs are used when the text defines none.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for syntax errors, unknown fields or invalid values.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(raw)?;
        let defaults = Self::default();

        let catalogs = if file.catalogs.is_empty() {
            default_catalogs()?
        } else {
            convert_catalogs(file.catalogs)?
        };

        let config = Self {
            mdblist_base_url: file.mdblist.base_url.unwrap_or(defaults.mdblist_base_url),
            tmdb: TmdbSettings {
                base_url: file.tmdb.base_url.unwrap_or(defaults.tmdb.base_url),
                api_key: file.tmdb.api_key.unwrap_or_default(),
                poster_base_url: file
                    .tmdb
                    .poster_base_url
                    .unwrap_or(defaults.tmdb.poster_base_url),
            },
            http: HttpSettings {
                connect_timeout_secs: file
                    .http
                    .connect_timeout_secs
                    .unwrap_or(defaults.http.connect_timeout_secs),
                read_timeout_secs: file
                    .http
                    .read_timeout_secs
                    .unwrap_or(defaults.http.read_timeout_secs),
            },
            enrich_concurrency: file
                .enrichment
                .concurrency
                .unwrap_or(defaults.enrich_concurrency),
            catalogs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `explicit_path`, or the default location.
    ///
    /// An explicit path must exist; a missing default file yields built-in
    /// defaults. Environment overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or is invalid.
    pub fn load(explicit_path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        let path = explicit_path
            .map(Path::to_path_buf)
            .or_else(resolve_default_config_path);

        let from_file = match path.as_deref() {
            Some(p) if explicit_path.is_some() || p.exists() => {
                let raw = fs::read_to_string(p).map_err(|source| ConfigError::Read {
                    path: p.to_path_buf(),
                    source,
                })?;
                info!(path = %p.display(), "loaded config file");
                Some(Self::from_toml_str(&raw)?)
            }
            _ => None,
        };

        let loaded_from_file = from_file.is_some();
        let mut config = match from_file {
            Some(config) => config,
            None => {
                debug!("no config file; using defaults");
                Self::from_toml_str("")?
            }
        };
        config.apply_env_overrides(|name| env::var(name).ok());

        Ok(LoadedConfig {
            path,
            loaded_from_file,
            config,
        })
    }

    /// Applies environment overrides using `lookup` (injectable for tests).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(TMDB_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            debug!("TMDB API key taken from environment");
            self.tmdb.api_key = key.trim().to_string();
        }
    }

    /// Finds a catalog by id (case-insensitive).
    #[must_use]
    pub fn catalog(&self, id: &str) -> Option<&CatalogDefinition> {
        self.catalogs
            .iter()
            .find(|catalog| catalog.id.eq_ignore_ascii_case(id.trim()))
    }

    /// Validates ranges and URL formats.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("mdblist.base_url", &self.mdblist_base_url)?;
        validate_url("tmdb.base_url", &self.tmdb.base_url)?;
        validate_url("tmdb.poster_base_url", &self.tmdb.poster_base_url)?;
        validate_timeout_secs("http.connect_timeout_secs", self.http.connect_timeout_secs)?;
        validate_timeout_secs("http.read_timeout_secs", self.http.read_timeout_secs)?;
        if !(1..=MAX_ENRICH_CONCURRENCY).contains(&self.enrich_concurrency) {
            return Err(invalid(
                "enrichment.concurrency",
                format!(
                    "{}. Expected range: 1..={MAX_ENRICH_CONCURRENCY}",
                    self.enrich_concurrency
                ),
            ));
        }
        Ok(())
    }

    /// Wires HTTP client, adapters, metadata service and enricher into an assembler.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the HTTP client or enricher cannot be built.
    pub fn build_assembler(&self) -> Result<CatalogAssembler, ConfigError> {
        let client = build_http_client(self.http)?;
        let lists = MdbListClient::with_base_url(client.clone(), &self.mdblist_base_url);
        let tmdb = TmdbClient::with_base_url(client, &self.tmdb.base_url, &self.tmdb.api_key);
        let metadata = MetadataService::new(Arc::new(tmdb), &self.tmdb.poster_base_url);
        let enricher = PosterEnricher::new(metadata, self.enrich_concurrency)?;
        Ok(CatalogAssembler::new(Arc::new(lists), enricher))
    }
}

/// Built-in catalog definitions.
///
/// # Errors
///
/// Returns [`ConfigError`] if the embedded definitions fail to parse.
pub fn default_catalogs() -> Result<Vec<CatalogDefinition>, ConfigError> {
    let parsed: CatalogsOnly = toml::from_str(DEFAULT_CATALOGS_TOML)?;
    convert_catalogs(parsed.catalogs)
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/media-catalog/config.toml`
/// 2. `$HOME/.config/media-catalog/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

fn convert_catalogs(sections: Vec<CatalogSection>) -> Result<Vec<CatalogDefinition>, ConfigError> {
    let mut catalogs: Vec<CatalogDefinition> = Vec::with_capacity(sections.len());
    for section in sections {
        let id = section.id.trim().to_string();
        if id.is_empty() {
            return Err(invalid("catalogs.id", "must not be blank"));
        }
        if catalogs.iter().any(|c| c.id.eq_ignore_ascii_case(&id)) {
            return Err(ConfigError::DuplicateCatalog(id));
        }

        let categories = if section.categories.is_empty() {
            None
        } else {
            let entries = section.categories.into_iter().map(|c| (c.key, c.matches));
            Some(
                CategoryMap::from_entries(entries).map_err(|source| ConfigError::Categories {
                    catalog: id.clone(),
                    source,
                })?,
            )
        };

        catalogs.push(CatalogDefinition {
            name: section.name.unwrap_or_else(|| id.clone()),
            id,
            media_type: section
                .media_type
                .unwrap_or_else(|| DEFAULT_CATALOG_TYPE.to_string()),
            owner: section.owner,
            list: section.list,
            categories,
        });
    }
    Ok(catalogs)
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: message.into(),
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| invalid(field, format!("'{value}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            format!("'{value}': scheme must be http or https"),
        ));
    }
    Ok(())
}

fn validate_timeout_secs(field: &str, value: u64) -> Result<(), ConfigError> {
    if !(1..=3600).contains(&value) {
        return Err(invalid(field, format!("{value}. Expected range: 1..=3600")));
    }
    Ok(())
}
