use crate::config::{StorageBackend, StorageConfig};
use crate::models::{ListRequest, ObjectListing, ObjectMeta, StoredObject};
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncReadExt;

/// Read-only view of the bucket the catalog is served from.
#[async_trait]
pub trait Storage: Send + Sync {
    /// One page of keys in ascending order.
    async fn list(&self, request: &ListRequest) -> Result<ObjectListing, AppError>;

    /// Metadata-only lookup. `Ok(None)` when the key does not exist.
    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>, AppError>;

    /// Open an object for streaming. `Ok(None)` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError>;

    /// Read a whole object into memory.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let Some(mut object) = self.get(key).await? else {
            return Ok(None);
        };
        let mut data = Vec::with_capacity(object.meta.size as usize);
        object
            .body
            .read_to_end(&mut data)
            .await
            .map_err(|e| AppError::storage(format!("Failed to read {}: {}", key, e)))?;
        Ok(Some(data))
    }
}

pub async fn build_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>, AppError> {
    match config.backend {
        StorageBackend::Local => Ok(Arc::new(LocalStorage::new(&config.local_path).await?)),
        StorageBackend::S3 => {
            let bucket = config.s3_bucket.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!(
                    "STORAGE_S3_BUCKET is required for the s3 backend"
                ))
            })?;
            let client =
                create_s3_client(config.s3_region.as_deref(), config.s3_endpoint.as_deref()).await;
            Ok(Arc::new(S3Storage::new(client, bucket)))
        }
    }
}

/// Select one page from keys already sorted ascending. Returns the page and
/// whether more matching keys follow it.
pub(crate) fn page_window<'a, I>(keys: I, request: &ListRequest) -> (Vec<&'a str>, bool)
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = request.prefix.as_deref().unwrap_or("");
    let after = request
        .continuation
        .as_deref()
        .or(request.start_after.as_deref());
    let mut matching = keys
        .into_iter()
        .filter(move |key| key.starts_with(prefix))
        .filter(move |key| after.is_none_or(|a| *key > a));

    let page: Vec<&str> = matching.by_ref().take(request.max_keys.max(1)).collect();
    let truncated = matching.next().is_some();
    (page, truncated)
}

/// Content type inferred from the key's extension, for backends that do not
/// store one.
pub(crate) fn content_type_for(key: &str) -> Option<&'static str> {
    let extension = key.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "json" => Some("application/json"),
        "txt" => Some("text/plain; charset=utf-8"),
        _ => None,
    }
}

/// Bucket emulation over a directory tree. Keys are `/`-joined paths relative
/// to `base_path`.
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }

    /// Map a key onto a path under `base_path`. Keys that could escape it, or
    /// that no file could have, resolve to `None`.
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty() {
            return None;
        }
        let mut path = self.base_path.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return None;
            }
            path.push(segment);
        }
        Some(path)
    }

    async fn all_keys(&self) -> Result<Vec<String>, AppError> {
        let mut keys = Vec::new();
        let mut pending = vec![(self.base_path.clone(), String::new())];

        while let Some((dir, key_prefix)) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    tracing::warn!(path = ?entry.path(), "Skipping non UTF-8 file name");
                    continue;
                };
                let key = format!("{}{}", key_prefix, name);
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push((entry.path(), format!("{}/", key)));
                } else if file_type.is_file() {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn meta(&self, key: &str, path: &Path) -> Result<Option<ObjectMeta>, AppError> {
        let metadata = match fs::metadata(path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let uploaded = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_default();
        Ok(Some(ObjectMeta {
            key: key.to_string(),
            size: metadata.len(),
            uploaded,
        }))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn list(&self, request: &ListRequest) -> Result<ObjectListing, AppError> {
        let keys = self.all_keys().await?;
        let (page, truncated) = page_window(keys.iter().map(String::as_str), request);
        let continuation = if truncated {
            page.last().map(|key| key.to_string())
        } else {
            None
        };

        let mut objects = Vec::with_capacity(page.len());
        for key in page {
            let Some(path) = self.resolve(key) else {
                continue;
            };
            if let Some(meta) = self.meta(key, &path).await? {
                objects.push(meta);
            }
        }

        Ok(ObjectListing {
            objects,
            truncated,
            continuation,
        })
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>, AppError> {
        match self.resolve(key) {
            Some(path) => self.meta(key, &path).await,
            None => Ok(None),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError> {
        let Some(path) = self.resolve(key) else {
            return Ok(None);
        };
        let Some(meta) = self.meta(key, &path).await? else {
            return Ok(None);
        };
        let file = match fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(StoredObject {
            meta,
            content_type: content_type_for(key).map(str::to_string),
            body: Box::pin(file),
        }))
    }
}

/// Create an S3 client. A custom endpoint (R2, MinIO, LocalStack) switches to
/// path-style addressing.
pub async fn create_s3_client(region: Option<&str>, endpoint: Option<&str>) -> S3Client {
    use aws_config::{BehaviorVersion, Region};

    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }

    if let Some(endpoint) = endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    let builder = aws_sdk_s3::config::Builder::from(&sdk_config);
    let s3_config = if endpoint.is_some() {
        builder.force_path_style(true).build()
    } else {
        builder.build()
    };

    S3Client::from_conf(s3_config)
}

pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

fn s3_timestamp(t: &aws_sdk_s3::primitives::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(t.secs(), t.subsec_nanos()).unwrap_or_default()
}

fn s3_size(size: Option<i64>) -> u64 {
    size.map_or(0, |s| s.max(0) as u64)
}

#[async_trait]
impl Storage for S3Storage {
    async fn list(&self, request: &ListRequest) -> Result<ObjectListing, AppError> {
        let max_keys = i32::try_from(request.max_keys).unwrap_or(i32::MAX);
        let mut req = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(max_keys);

        if let Some(prefix) = request.prefix.as_deref().filter(|p| !p.is_empty()) {
            req = req.prefix(prefix);
        }

        if let Some(token) = &request.continuation {
            req = req.continuation_token(token);
        } else if let Some(after) = &request.start_after {
            req = req.start_after(after);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| AppError::storage(format!("S3 list objects failed: {}", e)))?;

        let objects = resp
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|obj| {
                let key = obj.key?;
                Some(ObjectMeta {
                    key,
                    size: s3_size(obj.size),
                    uploaded: obj.last_modified.as_ref().map(s3_timestamp).unwrap_or_default(),
                })
            })
            .collect();

        let truncated = resp.is_truncated == Some(true);
        Ok(ObjectListing {
            objects,
            truncated,
            continuation: if truncated {
                resp.next_continuation_token
            } else {
                None
            },
        })
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>, AppError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(Some(ObjectMeta {
                key: key.to_string(),
                size: s3_size(output.content_length),
                uploaded: output
                    .last_modified
                    .as_ref()
                    .map(s3_timestamp)
                    .unwrap_or_default(),
            })),
            Err(e) => {
                let err = e.into_service_error();
                if err.is_not_found() {
                    Ok(None)
                } else {
                    Err(AppError::storage(format!("S3 head {} failed: {}", key, err)))
                }
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let err = e.into_service_error();
                if err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(AppError::storage(format!("S3 get {} failed: {}", key, err)));
            }
        };

        let meta = ObjectMeta {
            key: key.to_string(),
            size: s3_size(output.content_length),
            uploaded: output
                .last_modified
                .as_ref()
                .map(s3_timestamp)
                .unwrap_or_default(),
        };

        Ok(Some(StoredObject {
            meta,
            content_type: output.content_type,
            body: Box::pin(output.body.into_async_read()),
        }))
    }
}
