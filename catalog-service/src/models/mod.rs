pub mod file_entry;
pub mod manifest;
pub mod object;
pub mod page;

pub use file_entry::{is_pdf_key, FileEntry};
pub use manifest::Manifest;
pub use object::{ListRequest, ObjectBody, ObjectListing, ObjectMeta, StoredObject, MAX_LIST_KEYS};
pub use page::{parse_page_limit, CatalogPage, PageCursor, PageQuery, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
