//! List payload parsing.
//!
//! Turns a raw MDBList response body into typed [`ListItem`]s. The parser
//! distinguishes three outcomes:
//!
//! - the upstream's "empty or private" sentinel, reported as not-found (404)
//! - a body that is not a JSON array of objects, reported as malformed (500)
//! - a well-formed list, with entries lacking an identifier dropped
//!
//! Field names are matched case-insensitively, so `Title`, `title` and
//! `TITLE` all populate [`ListItem::title`].
//!
//! # Example
//!
//! ```
//! use catalog_core::parser::parse_list;
//!
//! let items = parse_list(r#"[{"imdb_id":"tt0077651","title":"Halloween","release_year":1978}]"#)
//!     .unwrap();
//! assert_eq!(items.len(), 1);
//! assert_eq!(items[0].title.as_deref(), Some("Halloween"));
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::model::ListItem;

/// Marker MDBList emits (in some casing) when a list is empty or private.
pub const EMPTY_OR_PRIVATE_MARKER: &str = "empty or private";

/// Message reported for empty or private lists.
pub const EMPTY_LIST_MESSAGE: &str = "MDBList is empty or does not exist.";

/// One list entry as MDBList sends it, after key lowercasing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawListEntry {
    imdb_id: Option<String>,
    title: Option<String>,
    mediatype: Option<String>,
    media_type: Option<String>,
    release_year: Option<i32>,
    poster_url: Option<String>,
}

impl From<RawListEntry> for ListItem {
    fn from(raw: RawListEntry) -> Self {
        Self {
            id: raw.imdb_id,
            title: raw.title,
            release_year: raw.release_year,
            media_type: raw.mediatype.or(raw.media_type),
            poster: raw.poster_url.filter(|url| !url.is_empty()),
        }
    }
}

/// Parses a raw list body into items, dropping entries without an identifier.
///
/// An all-dropped list is an empty success, not an error.
///
/// # Errors
///
/// - [`PipelineError::NotFound`] when the body carries the empty-or-private marker
/// - [`PipelineError::Malformed`] when the body is not a JSON array of objects
pub fn parse_list(body: &str) -> PipelineResult<Vec<ListItem>> {
    if body.to_ascii_lowercase().contains(EMPTY_OR_PRIVATE_MARKER) {
        debug!("list body carries empty-or-private marker");
        return Err(PipelineError::not_found(EMPTY_LIST_MESSAGE));
    }

    let entries: Vec<Map<String, Value>> =
        serde_json::from_str(body).map_err(|e| malformed_list(&e))?;
    let total = entries.len();

    let mut items = Vec::with_capacity(total);
    for entry in entries {
        let raw: RawListEntry = serde_json::from_value(Value::Object(lowercase_keys(entry)))
            .map_err(|e| malformed_list(&e))?;
        let item = ListItem::from(raw);
        if item.id.as_deref().is_some_and(|id| !id.trim().is_empty()) {
            items.push(item);
        }
    }

    debug!(total, kept = items.len(), "parsed list body");
    Ok(items)
}

fn malformed_list(error: &serde_json::Error) -> PipelineError {
    PipelineError::malformed(format!("Failed to deserialize MDBList JSON: {error}"))
}

/// Lowercases keys. When keys collide, the first non-null value wins.
fn lowercase_keys(entry: Map<String, Value>) -> Map<String, Value> {
    let mut folded = Map::with_capacity(entry.len());
    for (key, value) in entry {
        let key = key.to_ascii_lowercase();
        match folded.get(&key) {
            Some(existing) if !existing.is_null() => {}
            _ => {
                folded.insert(key, value);
            }
        }
    }
    folded
}
