use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    pub file: Option<String>,
}
