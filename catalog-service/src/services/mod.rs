pub mod catalog;
pub mod links;
pub mod memory_storage;
pub mod metrics;
pub mod preview;
pub mod storage;

pub use catalog::CatalogLister;
pub use memory_storage::MemoryStorage;
pub use metrics::{get_metrics, init_metrics};
pub use storage::{build_storage, LocalStorage, S3Storage, Storage};
