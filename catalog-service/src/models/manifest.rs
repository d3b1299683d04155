use serde::Deserialize;
use serde_json::{Map, Value};

/// The externally authored PDF manifest: file key to arbitrary metadata.
/// Only the keys are interpreted here, in document order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: Map<String, Value>,
}

impl Manifest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
