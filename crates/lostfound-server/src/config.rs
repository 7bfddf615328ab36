use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};
use lostfound_api::pagination::DEFAULT_MAX_PAGE_SIZE;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "your-secret-key",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub max_page_size: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = get("LOSTFOUND_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!(
                "LOSTFOUND_JWT_SECRET is unset or still a placeholder; \
                 it must match the identity service's secret"
            );
        }

        let db_path = get("LOSTFOUND_DB_PATH").unwrap_or_else(|| "lostfound.db".into()).into();
        let host = get("LOSTFOUND_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("LOSTFOUND_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("LOSTFOUND_PORT must be a port number")?;
        let max_page_size: u32 = match get("LOSTFOUND_MAX_PAGE_SIZE") {
            Some(v) => v.parse().context("LOSTFOUND_MAX_PAGE_SIZE must be a positive integer")?,
            None => DEFAULT_MAX_PAGE_SIZE,
        };
        if max_page_size == 0 {
            bail!("LOSTFOUND_MAX_PAGE_SIZE must be at least 1");
        }

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", host, port))?;

        Ok(Self {
            jwt_secret,
            db_path,
            addr,
            max_page_size,
        })
    }
}
