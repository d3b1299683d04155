use catalog_service::pdf::{page_count, CommandExecutor, PDFINFO_TIMEOUT};
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: pdf-pages <file.pdf>");
        return ExitCode::FAILURE;
    };

    let executor = CommandExecutor::new(PDFINFO_TIMEOUT);
    match page_count(&executor, &path).await {
        Ok(pages) => {
            println!("Pages: {}", pages);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
