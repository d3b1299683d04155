use crate::models::{parse_page_limit, CatalogPage, FileEntry, PageCursor, PageQuery};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ListFilesParams {
    pub cursor: Option<String>,
    /// Kept as text so malformed values fall back to the default.
    pub limit: Option<String>,
    pub prefix: Option<String>,
}

impl ListFilesParams {
    pub fn into_query(self) -> PageQuery {
        PageQuery {
            prefix: self.prefix.unwrap_or_default(),
            cursor: self.cursor.as_deref().and_then(PageCursor::parse),
            limit: parse_page_limit(self.limit.as_deref()),
        }
    }
}

/// `keys` may be absent or `null`; both mean no keys.
#[derive(Debug, Deserialize)]
pub struct FilesByKeysRequest {
    #[serde(default)]
    pub keys: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntryResponse {
    pub key: String,
    pub size: u64,
    pub uploaded: String,
}

impl From<FileEntry> for FileEntryResponse {
    fn from(entry: FileEntry) -> Self {
        Self {
            key: entry.key,
            size: entry.size,
            uploaded: entry.uploaded.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// `GET /api/files`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePageResponse {
    pub files: Vec<FileEntryResponse>,
    pub truncated: bool,
    pub cursor: Option<PageCursor>,
    pub total_returned: usize,
}

impl From<CatalogPage> for FilePageResponse {
    fn from(page: CatalogPage) -> Self {
        let files: Vec<FileEntryResponse> = page.files.into_iter().map(Into::into).collect();
        Self {
            total_returned: files.len(),
            files,
            truncated: page.truncated,
            cursor: page.cursor,
        }
    }
}

/// `GET /api/all-files` and `POST /api/files-by-keys`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    pub files: Vec<FileEntryResponse>,
    pub total_returned: usize,
}

impl From<Vec<FileEntry>> for FileListResponse {
    fn from(entries: Vec<FileEntry>) -> Self {
        let files: Vec<FileEntryResponse> = entries.into_iter().map(Into::into).collect();
        Self {
            total_returned: files.len(),
            files,
        }
    }
}
