use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub struct Config {
    pub port: u16,
    pub provider_url: String,
    pub access_key: String,
    pub cache_file: PathBuf,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let port = env::var("KURS_PORT")
            .unwrap_or_else(|_| "8888".to_string())
            .parse()
            .context("KURS_PORT must be a port number")?;
        let provider_url = env::var("KURS_PROVIDER_URL")
            .unwrap_or_else(|_| "http://data.fixer.io/api".to_string());
        let access_key = env::var("KURS_ACCESS_KEY").context("KURS_ACCESS_KEY must be set")?;
        let cache_file = env::var("KURS_CACHE_FILE")
            .unwrap_or_else(|_| "./data.json".to_string())
            .into();
        let timeout_secs = env::var("KURS_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("KURS_TIMEOUT_SECS must be a number of seconds")?;

        Ok(Self {
            port,
            provider_url,
            access_key,
            cache_file,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
