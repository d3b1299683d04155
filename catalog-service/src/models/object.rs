use chrono::{DateTime, Utc};
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Largest page a single upstream list call may return.
pub const MAX_LIST_KEYS: usize = 1000;

/// Metadata of one stored object, as reported by a listing or a HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    pub key: String,
    pub size: u64,
    pub uploaded: DateTime<Utc>,
}

/// One upstream list call.
///
/// `continuation` is the token handed back by a previous truncated listing;
/// when present it takes precedence over `start_after`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub prefix: Option<String>,
    pub start_after: Option<String>,
    pub continuation: Option<String>,
    pub max_keys: usize,
}

impl ListRequest {
    pub fn page(prefix: Option<String>) -> Self {
        Self {
            prefix,
            max_keys: MAX_LIST_KEYS,
            ..Default::default()
        }
    }

    pub fn starting_after(mut self, key: Option<String>) -> Self {
        self.start_after = key;
        self
    }

    pub fn continuing(mut self, token: Option<String>) -> Self {
        self.continuation = token;
        self
    }
}

/// One upstream page, in key order.
#[derive(Debug, Clone, Default)]
pub struct ObjectListing {
    pub objects: Vec<ObjectMeta>,
    pub truncated: bool,
    pub continuation: Option<String>,
}

pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

pub struct StoredObject {
    pub meta: ObjectMeta,
    pub content_type: Option<String>,
    pub body: ObjectBody,
}

impl std::fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredObject")
            .field("meta", &self.meta)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
