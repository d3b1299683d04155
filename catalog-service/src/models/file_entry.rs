use super::ObjectMeta;
use chrono::{DateTime, Utc};

const PDF_SUFFIX: &[u8] = b".pdf";

/// True when the key ends in `.pdf`, ignoring ASCII case.
pub fn is_pdf_key(key: &str) -> bool {
    let bytes = key.as_bytes();
    bytes.len() >= PDF_SUFFIX.len()
        && bytes[bytes.len() - PDF_SUFFIX.len()..].eq_ignore_ascii_case(PDF_SUFFIX)
}

/// A catalog row: one file, live in the bucket or hosted elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub key: String,
    pub size: u64,
    pub uploaded: DateTime<Utc>,
}

impl FileEntry {
    /// Placeholder row for a manifest key the bucket does not hold. Size and
    /// upload time are unknown, so they are reported as 0 and `seen_at`.
    pub fn external(key: impl Into<String>, seen_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            size: 0,
            uploaded: seen_at,
        }
    }
}

impl From<ObjectMeta> for FileEntry {
    fn from(meta: ObjectMeta) -> Self {
        Self {
            key: meta.key,
            size: meta.size,
            uploaded: meta.uploaded,
        }
    }
}
