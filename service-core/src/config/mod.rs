use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Listener settings shared by every service binary.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Port for `/health`, `/ready` and `/metrics`, kept off the public router.
    #[serde(default = "default_ops_port")]
    pub ops_port: u16,
}

fn default_port() -> u16 {
    8080
}

fn default_ops_port() -> u16 {
    9090
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            ops_port: default_ops_port(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
