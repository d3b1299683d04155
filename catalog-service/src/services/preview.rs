//! Open Graph / Twitter card page for link unfurlers.

use crate::config::SiteConfig;
use crate::services::links::file_id;
use askama::Template;

const THUMBNAIL_WIDTH: u32 = 300;
const THUMBNAIL_HEIGHT: u32 = 400;

/// Preview document for one file. Non-bot visitors are sent on to the
/// browser app by a meta refresh.
#[derive(Template)]
#[template(path = "og_preview.html")]
pub struct PreviewTemplate {
    pub title: String,
    pub description: String,
    pub page_url: String,
    pub thumbnail_url: String,
    pub site_name: String,
    pub id: String,
    pub width: u32,
    pub height: u32,
}

/// Link to the browser app showing `file`.
pub fn page_url(site: &SiteConfig, file: &str) -> String {
    format!("{}?file={}", site.site_url, urlencoding::encode(file))
}

pub fn preview_page(site: &SiteConfig, file: &str, thumbnail_url: &str) -> PreviewTemplate {
    let id = file_id(file).to_string();

    PreviewTemplate {
        title: format!("{} - {}", site.title, id),
        description: format!("View document {} from the {} archive", id, site.title),
        page_url: page_url(site, file),
        thumbnail_url: thumbnail_url.to_string(),
        site_name: site.name.clone(),
        id,
        width: THUMBNAIL_WIDTH,
        height: THUMBNAIL_HEIGHT,
    }
}
