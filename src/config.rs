use std::env;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use thiserror::Error;
use tracing::Level;

use crate::fetcher::DEFAULT_SEARCH_ENDPOINT;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8082";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub allowed_origin: String,
    pub search_endpoint: String,
    /// `None` means fetches may run forever.
    pub fetch_timeout: Option<Duration>,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            fetch_timeout: timeout_from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            log_level: Level::INFO,
        }
    }
}

/// Command line overrides, each one wins over the matching env var.
#[derive(Debug, Default, Parser)]
#[command(name = "tubeid", about = "Batch first-video lookup gateway")]
pub struct CliArgs {
    /// Address to listen on, e.g. 127.0.0.1:8082
    #[arg(long)]
    pub bind: Option<String>,

    /// The single origin allowed by CORS
    #[arg(long)]
    pub allowed_origin: Option<String>,

    #[arg(long)]
    pub search_endpoint: Option<String>,

    /// Per-fetch deadline in seconds, 0 disables it
    #[arg(long)]
    pub fetch_timeout_secs: Option<u64>,
}

impl Config {
    /// Reads the environment (and `.env` if present).
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        let get_or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let fetch_timeout = match lookup("TUBEID_FETCH_TIMEOUT_SECS") {
            Some(raw) => timeout_from_secs(parse_value("TUBEID_FETCH_TIMEOUT_SECS", &raw)?),
            None => timeout_from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };
        let log_level = match lookup("LOG_LEVEL") {
            Some(raw) => parse_value("LOG_LEVEL", &raw)?,
            None => Level::INFO,
        };

        Ok(Config {
            bind_addr: get_or_default("TUBEID_BIND", DEFAULT_BIND_ADDR),
            allowed_origin: get_or_default("TUBEID_ALLOWED_ORIGIN", DEFAULT_ALLOWED_ORIGIN),
            search_endpoint: get_or_default("TUBEID_SEARCH_ENDPOINT", DEFAULT_SEARCH_ENDPOINT),
            fetch_timeout,
            log_level,
        })
    }

    pub fn with_overrides(mut self, args: CliArgs) -> Config {
        if let Some(bind) = args.bind {
            self.bind_addr = bind;
        }
        if let Some(origin) = args.allowed_origin {
            self.allowed_origin = origin;
        }
        if let Some(endpoint) = args.search_endpoint {
            self.search_endpoint = endpoint;
        }
        if let Some(secs) = args.fetch_timeout_secs {
            self.fetch_timeout = timeout_from_secs(secs);
        }
        self
    }
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}
