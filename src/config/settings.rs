// src/config/settings.rs
//! Process settings read from the environment (and `.env` via dotenvy in the
//! binaries). Only the outer layer uses these; the pipeline never reads env.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_SCORING_CONFIG_PATH: &str = "config/scoring.toml";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

pub const ENV_SCORING_CONFIG_PATH: &str = "SCORING_CONFIG_PATH";
pub const ENV_BIND_ADDR: &str = "SCORING_BIND_ADDR";
pub const ENV_HOT_RELOAD: &str = "SCORING_HOT_RELOAD";
pub const ENV_METRICS_ENABLED: &str = "METRICS_ENABLED";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub hot_reload: bool,
    pub metrics_enabled: bool,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let config_path = env::var(ENV_SCORING_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SCORING_CONFIG_PATH));

        let raw_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = raw_addr
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {ENV_BIND_ADDR} `{raw_addr}`: {e}"))?;

        let log_format = match env::var(ENV_LOG_FORMAT)
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        Ok(Self {
            config_path,
            bind_addr,
            hot_reload: flag(ENV_HOT_RELOAD),
            metrics_enabled: flag(ENV_METRICS_ENABLED),
            log_format,
        })
    }
}

fn flag(name: &str) -> bool {
    matches!(
        env::var(name).unwrap_or_default().trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
