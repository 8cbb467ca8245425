use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;

use wedding_api::LinkConfig;

pub struct Config {
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub public_dir: PathBuf,
    pub links: LinkConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let var = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let or_default = |key: &str, default: &str| {
            var(key).map(str::to_string).unwrap_or_else(|| {
                info!("{} not set, using default: {}", key, default);
                default.to_string()
            })
        };

        let host = or_default("WEDDING_HOST", "0.0.0.0");
        let port: u16 = or_default("PORT", "3000")
            .parse()
            .context("PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let base_path = var("WEDDING_BASE_PATH")
            .map(|p| p.trim_end_matches('/').to_string())
            .unwrap_or_default();
        if !base_path.is_empty() && !base_path.starts_with('/') {
            bail!("WEDDING_BASE_PATH must start with '/', got '{}'", base_path);
        }

        Ok(Self {
            db_path: or_default("WEDDING_DB_PATH", "wedding.db").into(),
            addr,
            public_dir: or_default("WEDDING_PUBLIC_DIR", "public").into(),
            links: LinkConfig {
                base_path,
                public_url: var("WEDDING_PUBLIC_URL").map(str::to_string),
            },
        })
    }
}
