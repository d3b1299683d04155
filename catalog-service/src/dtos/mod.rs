pub mod files;
pub mod preview;

pub use files::{
    FileEntryResponse, FileListResponse, FilePageResponse, FilesByKeysRequest, ListFilesParams,
};
pub use preview::PreviewParams;
