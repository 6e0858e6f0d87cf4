//! Named catalog definitions: which list backs a catalog and how it is categorized.

use super::category::{ALL_CATEGORIES, CategoryMap, normalize_category};
use super::sort::SortKey;
use super::CatalogRequest;

/// Category whose entries are unrelated titles, presented alphabetically.
pub const MISCELLANEOUS_CATEGORY: &str = "miscellaneous";

/// A catalog backed by one curated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogDefinition {
    /// Stable identifier (e.g. "slasher").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Media kind the catalog serves.
    pub media_type: String,
    /// Owner of the backing list.
    pub owner: String,
    /// Slug of the backing list.
    pub list: String,
    /// Optional ordered category map.
    pub categories: Option<CategoryMap>,
}

impl CatalogDefinition {
    /// Default ordering for a requested category.
    ///
    /// Uncategorized catalogs keep list order. The miscellaneous category is
    /// alphabetical; every other request (including [`ALL_CATEGORIES`], where
    /// sorting is skipped anyway) is chronological.
    #[must_use]
    pub fn default_sort(&self, requested: Option<&str>) -> Option<SortKey> {
        self.categories.as_ref()?;
        let requested = requested.map(normalize_category).unwrap_or_default();
        if requested.eq_ignore_ascii_case(MISCELLANEOUS_CATEGORY) {
            Some(SortKey::NameAscending)
        } else {
            Some(SortKey::YearAscending)
        }
    }

    /// Category options in map order, with [`ALL_CATEGORIES`] first.
    #[must_use]
    pub fn category_options(&self) -> Vec<String> {
        let Some(categories) = &self.categories else {
            return Vec::new();
        };
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(categories.keys().map(str::to_string))
            .collect()
    }

    /// Builds the assembler request for `category`, applying the default sort
    /// unless `sort` overrides it.
    #[must_use]
    pub fn request(&self, category: Option<&str>, sort: Option<SortKey>) -> CatalogRequest {
        CatalogRequest {
            owner: self.owner.clone(),
            list: self.list.clone(),
            category: category.map(str::to_string),
            categories: self.categories.clone(),
            sort: sort.or_else(|| self.default_sort(category)),
        }
    }
}
