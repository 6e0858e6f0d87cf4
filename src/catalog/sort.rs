//! Catalog ordering by title or release year.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;
use crate::model::ListItem;

/// Sort order applied to filtered items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Title A→Z, case-insensitive.
    NameAscending,
    /// Title Z→A, case-insensitive.
    NameDescending,
    /// Oldest first; unknown years last.
    YearAscending,
    /// Newest first; unknown years first.
    YearDescending,
}

impl SortKey {
    /// All keys, in documentation order.
    pub const ALL: [Self; 4] = [
        Self::NameAscending,
        Self::NameDescending,
        Self::YearAscending,
        Self::YearDescending,
    ];

    /// Stable label used on the command line and in config files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameAscending => "name-asc",
            Self::NameDescending => "name-desc",
            Self::YearAscending => "year-asc",
            Self::YearDescending => "year-desc",
        }
    }

    fn compare(self, a: &ListItem, b: &ListItem) -> Ordering {
        match self {
            Self::NameAscending => title_key(a).cmp(&title_key(b)),
            Self::NameDescending => title_key(b).cmp(&title_key(a)),
            Self::YearAscending => year_key(a).cmp(&year_key(b)),
            Self::YearDescending => year_key(b).cmp(&year_key(a)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| PipelineError::invalid_input(format!("Invalid sort value: {value}")))
    }
}

/// Sorts `items` in place. Stable: equal keys keep their current order.
///
/// An unknown year counts as greater than every known year, so it lands last
/// ascending and first descending.
pub fn sort_items(items: &mut [ListItem], key: SortKey) {
    items.sort_by(|a, b| key.compare(a, b));
}

fn title_key(item: &ListItem) -> String {
    item.title.as_deref().unwrap_or_default().to_lowercase()
}

fn year_key(item: &ListItem) -> i32 {
    item.release_year.unwrap_or(i32::MAX)
}
