//! Request DTOs for the proxy API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::Deserialize;

/// Default number of search results requested upstream
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

/// Default quality level for track details
pub const DEFAULT_DETAIL_LEVEL: &str = "standard";

/// Default number of hot items reported
pub const DEFAULT_HOT_ITEMS_LIMIT: usize = 10;

/// Query string of `GET /api/music/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    /// Track name to search for
    pub name: Option<String>,
    /// Maximum number of results
    pub limit: Option<u32>,
}

impl SearchQuery {
    /// Validates the query, returning the trimmed search term.
    pub fn validate(&self) -> Result<&str, String> {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err("Track name cannot be empty".to_string()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }
}

/// Query string of `GET /api/music/detail`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailQuery {
    /// Track id
    pub id: Option<String>,
    /// Audio quality level
    pub level: Option<String>,
    /// Response format requested from upstream
    #[serde(rename = "type")]
    pub format: Option<String>,
}

impl DetailQuery {
    /// Validates the query, returning the trimmed track id.
    pub fn validate(&self) -> Result<&str, String> {
        match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err("Track id cannot be empty".to_string()),
        }
    }

    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_DETAIL_LEVEL)
    }

    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or("json")
    }
}

/// Query string of `GET /api/status/cache/hot`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotItemsQuery {
    pub limit: Option<usize>,
}

impl HotItemsQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_HOT_ITEMS_LIMIT)
    }
}

/// Which cache `POST /api/cache/clear` empties
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearTarget {
    Search,
    Detail,
    #[default]
    All,
}

impl ClearTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClearTarget::Search => "search",
            ClearTarget::Detail => "detail",
            ClearTarget::All => "all",
        }
    }
}

/// Request body for `POST /api/cache/clear`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearCacheRequest {
    #[serde(rename = "type", default)]
    pub target: ClearTarget,
}
