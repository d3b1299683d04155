use super::executor::CommandExecutor;
use service_core::error::AppError;
use std::path::Path;
use std::time::Duration;

pub const PDFINFO_TIMEOUT: Duration = Duration::from_secs(30);

/// Extract the page count from `pdfinfo` output.
pub fn parse_page_count(output: &[u8]) -> Result<u32, AppError> {
    let text = String::from_utf8_lossy(output);

    let line = text
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!("Page count not found in pdfinfo output"))
        })?;

    line.trim().parse::<u32>().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to parse page count: {}", e))
    })
}

pub async fn page_count(executor: &CommandExecutor, path: &Path) -> Result<u32, AppError> {
    let path_str = path.to_str().ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("Path is not valid UTF-8: {}", path.display()))
    })?;

    let output = executor.execute("pdfinfo", &[path_str]).await?;
    let pages = parse_page_count(&output.stdout)?;

    tracing::debug!(path = %path.display(), pages, "Counted PDF pages");
    Ok(pages)
}
