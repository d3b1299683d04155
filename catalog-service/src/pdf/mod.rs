pub mod executor;
pub mod page_count;

pub use executor::CommandExecutor;
pub use page_count::{page_count, parse_page_count, PDFINFO_TIMEOUT};
