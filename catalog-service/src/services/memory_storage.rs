use crate::models::{ListRequest, ObjectListing, ObjectMeta, StoredObject};
use crate::services::storage::{content_type_for, page_window, Storage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct MemoryObject {
    data: Vec<u8>,
    content_type: Option<String>,
    uploaded: DateTime<Utc>,
}

/// In-process bucket with the same listing semantics as the real backends.
///
/// `page_size` caps every list call below the requested `max_keys`, which lets
/// tests exercise multi-page drains with a handful of objects. Keys added with
/// [`MemoryStorage::fail_key`] make `head`/`get` return a storage error.
/// [`MemoryStorage::without_continuation`] mimics a backend that reports a
/// truncated listing but hands out no token.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: RwLock<BTreeMap<String, MemoryObject>>,
    failing: RwLock<HashSet<String>>,
    page_size: Option<usize>,
    omit_continuation: bool,
    list_calls: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    pub fn without_continuation(mut self) -> Self {
        self.omit_continuation = true;
        self
    }

    pub async fn put(&self, key: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.put_at(key, data, Utc::now()).await;
    }

    pub async fn put_at(
        &self,
        key: impl Into<String>,
        data: impl Into<Vec<u8>>,
        uploaded: DateTime<Utc>,
    ) {
        let key = key.into();
        let content_type = content_type_for(&key).map(str::to_string);
        self.objects.write().await.insert(
            key,
            MemoryObject {
                data: data.into(),
                content_type,
                uploaded,
            },
        );
    }

    pub async fn fail_key(&self, key: impl Into<String>) {
        self.failing.write().await.insert(key.into());
    }

    /// Number of `list` calls served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn check(&self, key: &str) -> Result<(), AppError> {
        if self.failing.read().await.contains(key) {
            return Err(AppError::storage(format!("injected failure for {}", key)));
        }
        Ok(())
    }

    fn meta(key: &str, object: &MemoryObject) -> ObjectMeta {
        ObjectMeta {
            key: key.to_string(),
            size: object.data.len() as u64,
            uploaded: object.uploaded,
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn list(&self, request: &ListRequest) -> Result<ObjectListing, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let mut request = request.clone();
        if let Some(page_size) = self.page_size {
            request.max_keys = request.max_keys.min(page_size);
        }

        let objects = self.objects.read().await;
        let (page, truncated) = page_window(objects.keys().map(String::as_str), &request);

        let listed: Vec<ObjectMeta> = page
            .iter()
            .filter_map(|key| objects.get(*key).map(|o| Self::meta(key, o)))
            .collect();

        Ok(ObjectListing {
            continuation: if truncated && !self.omit_continuation {
                page.last().map(|key| key.to_string())
            } else {
                None
            },
            objects: listed,
            truncated,
        })
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>, AppError> {
        self.check(key).await?;
        Ok(self
            .objects
            .read()
            .await
            .get(key)
            .map(|o| Self::meta(key, o)))
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError> {
        self.check(key).await?;
        let objects = self.objects.read().await;
        Ok(objects.get(key).map(|o| StoredObject {
            meta: Self::meta(key, o),
            content_type: o.content_type.clone(),
            body: Box::pin(Cursor::new(o.data.clone())),
        }))
    }
}
