use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Provider movie listing category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogType {
    #[default]
    Popular,
    TopRated,
    Upcoming,
    NowPlaying,
}

impl CatalogType {
    /// Path segment used by the provider (`/movie/{segment}`)
    pub fn as_path(&self) -> &'static str {
        match self {
            CatalogType::Popular => "popular",
            CatalogType::TopRated => "top_rated",
            CatalogType::Upcoming => "upcoming",
            CatalogType::NowPlaying => "now_playing",
        }
    }
}

impl fmt::Display for CatalogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

impl FromStr for CatalogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "popular" => Ok(CatalogType::Popular),
            "top_rated" => Ok(CatalogType::TopRated),
            "upcoming" => Ok(CatalogType::Upcoming),
            "now_playing" => Ok(CatalogType::NowPlaying),
            _ => Err(format!(
                "Invalid catalog: {}. Use 'popular', 'top_rated', 'upcoming', or 'now_playing'",
                s
            )),
        }
    }
}

/// Position in the provider's paginated catalog
///
/// `page_index` is the 1-based page the next replenishment cycle fetches first.
/// It only moves forward once a page's results have been merged into the queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationCursor {
    pub page_index: u32,
    pub catalog_type: CatalogType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_date: Option<DateTime<Utc>>,
}

impl PaginationCursor {
    pub fn new(catalog_type: CatalogType) -> Self {
        Self {
            page_index: 1,
            catalog_type,
            last_sync_date: None,
        }
    }

    /// Cursor positioned after `page`, stamped with `now`
    pub fn after_page(&self, page: u32, now: DateTime<Utc>) -> Self {
        Self {
            page_index: page.saturating_add(1),
            catalog_type: self.catalog_type,
            last_sync_date: Some(now),
        }
    }
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::new(CatalogType::default())
    }
}
