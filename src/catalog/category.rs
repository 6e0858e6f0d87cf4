//! Category maps and title-substring filtering.
//!
//! A [`CategoryMap`] is an ordered association from category key to match
//! substrings. Order matters: when the caller asks for [`ALL_CATEGORIES`],
//! kept items are ranked by the first category (in map order) whose
//! substrings match their title.

use thiserror::Error;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::model::ListItem;

/// Requested-category sentinel selecting every category in map order.
pub const ALL_CATEGORIES: &str = "all";

/// Errors raised while building a [`CategoryMap`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryMapError {
    /// A category key was empty or whitespace.
    #[error("category key must not be blank")]
    BlankKey,

    /// The same key (ignoring case) was inserted twice.
    #[error("duplicate category key '{key}'")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },

    /// A category had no usable match substrings.
    #[error("category '{key}' must have at least one non-blank match substring")]
    EmptyMatches {
        /// The offending key.
        key: String,
    },
}

/// Ordered category key → match substrings. Keys and substrings compare
/// case-insensitively; values are never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    entries: Vec<(String, Vec<String>)>,
}

impl CategoryMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(key, substrings)` pairs, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryMapError`] for blank keys, duplicate keys or empty
    /// substring lists.
    pub fn from_entries<I, K, V, S>(entries: I) -> Result<Self, CategoryMapError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for (key, matches) in entries {
            map.insert(key, matches)?;
        }
        Ok(map)
    }

    /// Appends a category at the end of the map.
    ///
    /// Substrings are stored lowercased; blank substrings are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryMapError`] for a blank key, a key already present, or
    /// no remaining substrings.
    pub fn insert<K, V, S>(&mut self, key: K, matches: V) -> Result<(), CategoryMapError>
    where
        K: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(CategoryMapError::BlankKey);
        }
        if self.position(&key).is_some() {
            return Err(CategoryMapError::DuplicateKey { key });
        }
        let matches: Vec<String> = matches
            .into_iter()
            .map(|m| m.into().to_lowercase())
            .filter(|m| !m.trim().is_empty())
            .collect();
        if matches.is_empty() {
            return Err(CategoryMapError::EmptyMatches { key });
        }
        self.entries.push((key, matches));
        Ok(())
    }

    /// Returns the lowercased substrings for `key` (case-insensitive).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.position(key).map(|index| self.entries[index].1.as_slice())
    }

    /// Returns true when `key` (case-insensitive) is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Category keys in map order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no categories are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        let key = key.trim().to_lowercase();
        self.entries
            .iter()
            .position(|(existing, _)| existing.to_lowercase() == key)
    }

    /// Index of the first category whose substrings match `title`.
    fn first_match_index(&self, title: &str) -> Option<usize> {
        let title = title.to_lowercase();
        self.entries
            .iter()
            .position(|(_, matches)| matches_any(&title, matches))
    }
}

/// How a requested category resolved against a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySelection<'a> {
    /// No map, or a blank request: every item is kept as-is.
    Unfiltered,
    /// The [`ALL_CATEGORIES`] sentinel: keep matches of any category, ranked by map order.
    Aggregate(&'a CategoryMap),
    /// A single category's lowercased substrings.
    Category(&'a [String]),
}

impl CategorySelection<'_> {
    /// Returns the mode this selection filters in.
    #[must_use]
    pub fn mode(&self) -> FilterMode {
        match self {
            Self::Unfiltered => FilterMode::Unfiltered,
            Self::Aggregate(_) => FilterMode::Aggregate,
            Self::Category(_) => FilterMode::Category,
        }
    }

    /// Applies the selection to `items`.
    #[must_use]
    pub fn apply(&self, items: Vec<ListItem>) -> Vec<ListItem> {
        match self {
            Self::Unfiltered => items,
            Self::Category(matches) => items
                .into_iter()
                .filter(|item| {
                    item.title
                        .as_deref()
                        .is_some_and(|title| matches_any(&title.to_lowercase(), matches))
                })
                .collect(),
            Self::Aggregate(map) => {
                let mut ranked: Vec<(usize, ListItem)> = items
                    .into_iter()
                    .filter_map(|item| {
                        let rank = map.first_match_index(item.title.as_deref()?)?;
                        Some((rank, item))
                    })
                    .collect();
                // Stable: items of equal rank keep source order.
                ranked.sort_by_key(|(rank, _)| *rank);
                ranked.into_iter().map(|(_, item)| item).collect()
            }
        }
    }
}

/// Which filtering path produced a [`FilterOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Items passed through unchanged.
    Unfiltered,
    /// Items filtered by a single category.
    Category,
    /// Items filtered and ranked across all categories.
    Aggregate,
}

impl FilterMode {
    /// True for the aggregate path, whose map-order ranking is final.
    #[must_use]
    pub fn skips_sorting(self) -> bool {
        self == Self::Aggregate
    }
}

/// Filtered items and the path that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Kept items, in output order.
    pub items: Vec<ListItem>,
    /// Filtering path taken.
    pub mode: FilterMode,
}

/// Strips a leading `key=` prefix and surrounding whitespace from a requested category.
///
/// Callers sometimes pass query-style tokens (`genre=Halloween`) as path segments.
#[must_use]
pub fn normalize_category(requested: &str) -> &str {
    match requested.split_once('=') {
        Some((_, value)) => value.trim(),
        None => requested.trim(),
    }
}

/// Resolves a requested category against an optional map.
///
/// # Errors
///
/// Returns 400 `Invalid filter value: <value>` when a map is present and the
/// non-blank request is neither [`ALL_CATEGORIES`] nor a key of the map.
pub fn select_category<'a>(
    requested: Option<&str>,
    map: Option<&'a CategoryMap>,
) -> PipelineResult<CategorySelection<'a>> {
    let requested = requested.map(normalize_category).unwrap_or_default();
    let Some(map) = map else {
        return Ok(CategorySelection::Unfiltered);
    };
    if requested.is_empty() {
        return Ok(CategorySelection::Unfiltered);
    }
    if requested.eq_ignore_ascii_case(ALL_CATEGORIES) {
        return Ok(CategorySelection::Aggregate(map));
    }
    map.get(requested)
        .map(CategorySelection::Category)
        .ok_or_else(|| PipelineError::invalid_input(format!("Invalid filter value: {requested}")))
}

/// Filters `items` for the requested category.
///
/// # Errors
///
/// See [`select_category`].
pub fn filter_items(
    items: Vec<ListItem>,
    requested: Option<&str>,
    map: Option<&CategoryMap>,
) -> PipelineResult<FilterOutcome> {
    let selection = select_category(requested, map)?;
    let before = items.len();
    let items = selection.apply(items);
    let mode = selection.mode();
    debug!(?mode, before, after = items.len(), "filtered list items");
    Ok(FilterOutcome { items, mode })
}

fn matches_any(lowercase_title: &str, matches: &[String]) -> bool {
    matches.iter().any(|m| lowercase_title.contains(m.as_str()))
}
