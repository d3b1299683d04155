use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_MANIFEST_KEY: &str = "pdfs-as-jpegs/manifest.json";
pub const DEFAULT_SITE_URL: &str = "https://epstein-files-browser.vercel.app";
pub const DEFAULT_EXTERNAL_DOCUMENTS_URL: &str = "https://www.justice.gov/epstein/files";

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub storage: StorageConfig,
    pub manifest_key: String,
    pub site: SiteConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub local_path: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom S3 endpoint, e.g. an R2 account URL.
    pub s3_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    S3,
}

/// Branding and link targets used by the preview page and redirects.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Browser app that preview pages link to.
    pub site_url: String,
    pub name: String,
    pub title: String,
    /// Origin thumbnails are served from. Derived from the request when unset.
    pub public_origin: Option<String>,
    /// Repository that volume PDFs missing from the bucket redirect to.
    pub external_documents_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            name: "Epstein Files Browser".to_string(),
            title: "Epstein Files".to_string(),
            public_origin: None,
            external_documents_url: DEFAULT_EXTERNAL_DOCUMENTS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl CatalogConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";
        let defaults = SiteConfig::default();

        Ok(CatalogConfig {
            common: common_config,
            storage: StorageConfig {
                backend: get_env("STORAGE_BACKEND", Some("local"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                local_path: get_env("STORAGE_LOCAL_PATH", Some("storage"), is_prod)?,
                s3_bucket: optional_env("STORAGE_S3_BUCKET"),
                s3_region: optional_env("STORAGE_S3_REGION"),
                s3_endpoint: optional_env("STORAGE_S3_ENDPOINT"),
            },
            manifest_key: get_env("MANIFEST_KEY", Some(DEFAULT_MANIFEST_KEY), false)?,
            site: SiteConfig {
                site_url: get_env("SITE_URL", Some(&defaults.site_url), false)?,
                name: get_env("SITE_NAME", Some(&defaults.name), false)?,
                title: get_env("SITE_TITLE", Some(&defaults.title), false)?,
                public_origin: optional_env("PUBLIC_ORIGIN")
                    .map(|origin| origin.trim_end_matches('/').to_string()),
                external_documents_url: get_env(
                    "EXTERNAL_DOCUMENTS_URL",
                    Some(&defaults.external_documents_url),
                    false,
                )?,
            },
            telemetry: TelemetryConfig {
                log_level: get_env("LOG_LEVEL", Some("info"), false)?,
                otlp_endpoint: optional_env("OTLP_ENDPOINT"),
            },
        })
    }

    /// Defaults with random ports and local storage under `local_path`.
    pub fn for_local(local_path: impl Into<String>) -> Self {
        CatalogConfig {
            common: core_config::Config {
                port: 0,
                ops_port: 0,
            },
            storage: StorageConfig {
                backend: StorageBackend::Local,
                local_path: local_path.into(),
                s3_bucket: None,
                s3_region: None,
                s3_endpoint: None,
            },
            manifest_key: DEFAULT_MANIFEST_KEY.to_string(),
            site: SiteConfig::default(),
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
                otlp_endpoint: None,
            },
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "s3" | "r2" => Ok(StorageBackend::S3),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
