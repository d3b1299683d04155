use super::FileEntry;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: usize = 100;
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Continuation token handed to clients. Clients must echo it back verbatim;
/// today it carries the last key of the previous page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn after_key(key: &str) -> Self {
        Self(key.to_string())
    }

    /// Parse a client-supplied token. Empty tokens mean "from the start".
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    /// Key the next listing starts strictly after.
    pub fn start_after(&self) -> &str {
        &self.0
    }
}

/// Parse a `limit` query value, clamped to `1..=MAX_PAGE_LIMIT`.
/// Missing or non-numeric values fall back to `DEFAULT_PAGE_LIMIT`.
pub fn parse_page_limit(raw: Option<&str>) -> usize {
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if n < 1 => 1,
        Some(n) => usize::try_from(n).map_or(MAX_PAGE_LIMIT, |n| n.min(MAX_PAGE_LIMIT)),
        None => DEFAULT_PAGE_LIMIT,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub prefix: String,
    pub cursor: Option<PageCursor>,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub files: Vec<FileEntry>,
    pub truncated: bool,
    pub cursor: Option<PageCursor>,
}
