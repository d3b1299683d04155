//! Catalog listing over the bucket and the external-files manifest.
//!
//! Three read paths share the `.pdf` filter:
//! - [`CatalogLister::list_page`] walks upstream pages until it has one more
//!   qualifying entry than requested, so it can tell whether more follow.
//! - [`CatalogLister::list_all`] drains the bucket and appends manifest keys
//!   the bucket does not hold.
//! - [`CatalogLister::lookup`] HEADs a set of keys concurrently.

use crate::models::{
    is_pdf_key, CatalogPage, FileEntry, ListRequest, Manifest, ObjectListing, PageCursor,
    PageQuery, MAX_PAGE_LIMIT,
};
use crate::services::Storage;
use chrono::Utc;
use futures::future::join_all;
use metrics::counter;
use service_core::error::AppError;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

#[derive(Clone)]
pub struct CatalogLister {
    storage: Arc<dyn Storage>,
    manifest_key: String,
}

impl CatalogLister {
    pub fn new(storage: Arc<dyn Storage>, manifest_key: impl Into<String>) -> Self {
        Self {
            storage,
            manifest_key: manifest_key.into(),
        }
    }

    pub fn manifest_key(&self) -> &str {
        &self.manifest_key
    }

    async fn fetch_page(&self, request: &ListRequest) -> Result<ObjectListing, AppError> {
        counter!("catalog_upstream_pages_total").increment(1);
        self.storage.list(request).await
    }

    /// One page of PDF entries after `query.cursor`, in key order.
    pub async fn list_page(&self, query: &PageQuery) -> Result<CatalogPage, AppError> {
        let limit = query.limit.clamp(1, MAX_PAGE_LIMIT);
        let prefix = Some(query.prefix.clone()).filter(|p| !p.is_empty());

        let mut files: Vec<FileEntry> = Vec::new();
        let mut has_more_upstream = true;
        let mut continuation: Option<String> = None;
        let mut first_request = true;

        while files.len() <= limit && has_more_upstream {
            let mut request = ListRequest::page(prefix.clone());
            if first_request {
                request = request.starting_after(
                    query.cursor.as_ref().map(|c| c.start_after().to_string()),
                );
                first_request = false;
            } else {
                request = request.continuing(continuation.take());
            }

            let listing = self.fetch_page(&request).await?;
            files.extend(
                listing
                    .objects
                    .into_iter()
                    .filter(|o| is_pdf_key(&o.key))
                    .map(FileEntry::from),
            );

            has_more_upstream = listing.truncated;
            continuation = listing.continuation;
            if has_more_upstream && continuation.is_none() {
                tracing::warn!(
                    prefix = %query.prefix,
                    "Upstream listing truncated without a continuation token"
                );
                has_more_upstream = false;
            }
        }

        let has_more = files.len() > limit || has_more_upstream;
        files.truncate(limit);

        let cursor = if has_more {
            files.last().map(|f| PageCursor::after_key(&f.key))
        } else {
            None
        };

        tracing::debug!(
            prefix = %query.prefix,
            limit,
            returned = files.len(),
            truncated = has_more,
            "Listed catalog page"
        );

        Ok(CatalogPage {
            files,
            truncated: has_more,
            cursor,
        })
    }

    /// Every PDF in the bucket followed by manifest-only keys. Manifest
    /// problems are logged and leave a bucket-only result.
    pub async fn list_all(&self) -> Result<Vec<FileEntry>, AppError> {
        let mut files: Vec<FileEntry> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut continuation: Option<String> = None;

        loop {
            let request = ListRequest::page(None).continuing(continuation.take());
            let listing = self.fetch_page(&request).await?;

            for object in listing.objects {
                if is_pdf_key(&object.key) && seen.insert(object.key.clone()) {
                    files.push(FileEntry::from(object));
                }
            }

            if !listing.truncated {
                break;
            }
            match listing.continuation {
                Some(token) => continuation = Some(token),
                None => {
                    tracing::warn!("Upstream listing truncated without a continuation token");
                    break;
                }
            }
        }

        let in_bucket = files.len();
        if let Some(manifest) = self.load_manifest().await {
            let seen_at = Utc::now();
            for key in manifest.keys() {
                if seen.insert(key.to_string()) {
                    files.push(FileEntry::external(key, seen_at));
                }
            }
        }

        tracing::info!(
            in_bucket,
            external = files.len() - in_bucket,
            "Listed all catalog files"
        );

        Ok(files)
    }

    async fn load_manifest(&self) -> Option<Manifest> {
        let bytes = match self.storage.read(&self.manifest_key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::info!(key = %self.manifest_key, "No manifest in bucket");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %self.manifest_key, error = %e, "Failed to fetch manifest");
                return None;
            }
        };

        match Manifest::from_slice(&bytes) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::warn!(key = %self.manifest_key, error = %e, "Failed to parse manifest");
                None
            }
        }
    }

    /// Metadata for the given keys, sorted by key. Missing keys are left out,
    /// as are keys whose lookup failed.
    pub async fn lookup(&self, keys: &[String]) -> Vec<FileEntry> {
        let unique: BTreeSet<&str> = keys.iter().map(String::as_str).collect();

        let results = join_all(unique.iter().map(|key| async move {
            (*key, self.storage.head(key).await)
        }))
        .await;

        let mut files: Vec<FileEntry> = Vec::with_capacity(results.len());
        for (key, result) in results {
            match result {
                Ok(Some(meta)) => files.push(FileEntry::from(meta)),
                Ok(None) => counter!("catalog_lookup_misses_total").increment(1),
                Err(e) => {
                    counter!("catalog_lookup_misses_total").increment(1);
                    tracing::warn!(key = %key, error = %e, "Metadata lookup failed");
                }
            }
        }

        files.sort_by(|a, b| a.key.cmp(&b.key));
        files
    }
}
