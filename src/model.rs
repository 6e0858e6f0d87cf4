//! Data model for lists, catalog entries and poster lookups.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Prefix every list identifier eligible for poster enrichment starts with.
pub const IMDB_ID_PREFIX: &str = "tt";

/// Media type reported for catalog entries whose list item carries none.
pub const DEFAULT_CATALOG_TYPE: &str = "movie";

/// One entry of a curated list.
///
/// Only [`ListItem::poster`] changes after parsing, and only through enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListItem {
    /// External identifier, normally `tt` followed by digits.
    #[serde(rename = "imdb_id")]
    pub id: Option<String>,
    /// Display title.
    pub title: Option<String>,
    /// Release year.
    pub release_year: Option<i32>,
    /// Free-form media kind (e.g. "movie", "show").
    #[serde(rename = "mediatype")]
    pub media_type: Option<String>,
    /// Full poster URL once resolved.
    #[serde(rename = "poster_url")]
    pub poster: Option<String>,
}

impl ListItem {
    /// Creates an item with an identifier, title and year.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, release_year: Option<i32>) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
            release_year,
            media_type: None,
            poster: None,
        }
    }

    /// Returns the identifier when it is eligible for a poster lookup.
    #[must_use]
    pub fn enrichable_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty() && id.starts_with(IMDB_ID_PREFIX))
    }

    /// Projects this item into its externally shaped catalog entry.
    #[must_use]
    pub fn to_catalog_item(&self) -> CatalogItem {
        CatalogItem {
            id: self.id.clone().unwrap_or_default(),
            kind: self
                .media_type
                .clone()
                .filter(|kind| !kind.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATALOG_TYPE.to_string()),
            name: self.title.clone().unwrap_or_default(),
            poster: self.poster.clone().unwrap_or_default(),
            year: self.release_year.unwrap_or(0),
        }
    }
}

/// A fetched list. Request-scoped; never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaList {
    /// Owner of the list on the list-hosting service.
    pub owner: String,
    /// List slug.
    pub name: String,
    /// Items in source order.
    pub items: Vec<ListItem>,
}

impl MediaList {
    /// Number of items in the list.
    #[must_use]
    pub fn results(&self) -> usize {
        self.items.len()
    }
}

impl Serialize for MediaList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MediaList", 4)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("owner", &self.owner)?;
        state.serialize_field("results", &self.results())?;
        state.serialize_field("items", &self.items)?;
        state.end()
    }
}

/// Enrichment-complete projection of a [`ListItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    /// External identifier.
    pub id: String,
    /// Media kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Display name.
    pub name: String,
    /// Poster URL, empty when none was resolved.
    pub poster: String,
    /// Release year, 0 when unknown.
    pub year: i32,
}

/// Final pipeline output. Order is fixed once assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    /// Catalog entries in presentation order.
    pub metas: Vec<CatalogItem>,
}

impl Catalog {
    /// Returns the identifiers of all entries, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.metas.iter().map(|item| item.id.as_str()).collect()
    }
}

/// A resolved poster for a single identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Poster {
    /// Identifier the poster was resolved for.
    pub imdb_id: String,
    /// Full poster URL (base URL + upstream path).
    pub poster_path: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_enrichable_id_requires_prefix() {
        assert_eq!(
            ListItem::new("tt0077651", "Halloween", Some(1978)).enrichable_id(),
            Some("tt0077651")
        );
        assert_eq!(ListItem::new("nm0000001", "x", None).enrichable_id(), None);
        assert_eq!(ListItem::new("", "x", None).enrichable_id(), None);
        assert_eq!(ListItem::default().enrichable_id(), None);
    }

    #[test]
    fn test_catalog_projection_fills_defaults() {
        let item = ListItem {
            id: Some("tt1".to_string()),
            ..ListItem::default()
        };
        let projected = item.to_catalog_item();
        assert_eq!(projected.id, "tt1");
        assert_eq!(projected.kind, "movie");
        assert_eq!(projected.name, "");
        assert_eq!(projected.poster, "");
        assert_eq!(projected.year, 0);
    }

    #[test]
    fn test_catalog_projection_keeps_media_type() {
        let mut item = ListItem::new("tt2", "Show", Some(2001));
        item.media_type = Some("show".to_string());
        item.poster = Some("https://img/p.jpg".to_string());
        let projected = item.to_catalog_item();
        assert_eq!(projected.kind, "show");
        assert_eq!(projected.poster, "https://img/p.jpg");
        assert_eq!(projected.year, 2001);
    }

    #[test]
    fn test_catalog_item_serializes_type_field() {
        let json = serde_json::to_value(ListItem::new("tt3", "A", None).to_catalog_item()).unwrap();
        assert_eq!(json["type"], "movie");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_media_list_serializes_result_count() {
        let list = MediaList {
            owner: "owner".to_string(),
            name: "name".to_string(),
            items: vec![ListItem::new("tt1", "A", None), ListItem::new("tt2", "B", None)],
        };
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["results"], 2);
        assert_eq!(json["items"][1]["imdb_id"], "tt2");
    }
}
