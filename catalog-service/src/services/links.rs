use once_cell::sync::Lazy;
use regex::Regex;

static FILE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"EFTA\d+").expect("file id pattern must compile"));

static VOLUME_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^VOL(\d+)$").expect("volume pattern must compile"));

pub const THUMBNAIL_PREFIX: &str = "thumbnails/";

/// Short document id for display: the first `EFTA<digits>` run in the key,
/// else its last path segment.
pub fn file_id(key: &str) -> &str {
    if let Some(m) = FILE_ID.find(key) {
        return m.as_str();
    }
    match key.rsplit('/').next() {
        Some(last) if !last.is_empty() => last,
        _ => key,
    }
}

/// Bucket key of the JPEG thumbnail rendered for a PDF.
pub fn thumbnail_key(file: &str) -> String {
    let stem = file.strip_suffix(".pdf");
    match stem {
        Some(stem) => format!("{}{}.jpg", THUMBNAIL_PREFIX, stem),
        None => format!("{}{}", THUMBNAIL_PREFIX, file),
    }
}

/// Where a volume PDF lives when it is not mirrored in the bucket:
/// `VOL00007/IMAGES/0001/EFTA00000001.pdf` maps to
/// `<base>/DataSet%207/EFTA00000001.pdf`.
pub fn external_document_url(base: &str, path: &str) -> Option<String> {
    if !path.ends_with(".pdf") {
        return None;
    }

    let mut segments = path.split('/');
    let volume = segments.next()?;
    let filename = path.rsplit('/').next()?;
    let number: u64 = VOLUME_SEGMENT.captures(volume)?.get(1)?.as_str().parse().ok()?;

    Some(format!(
        "{}/DataSet%20{}/{}",
        base.trim_end_matches('/'),
        number,
        filename
    ))
}
