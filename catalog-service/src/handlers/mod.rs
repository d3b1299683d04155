pub mod files;
pub mod health;
pub mod manifest;
pub mod objects;
pub mod preview;

pub use files::{all_files, files_by_keys, list_files};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use manifest::get_manifest;
pub use objects::serve_object;
pub use preview::og_preview;
