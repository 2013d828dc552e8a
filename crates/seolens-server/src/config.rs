use clap::{Parser, ValueEnum};
use seolens_core::CacheConfig;
use seolens_core::FetchConfig;
use seolens_core::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use seolens_core::fetcher::{DEFAULT_MAX_BODY_BYTES, DEFAULT_TIMEOUT, default_user_agent};
use std::net::SocketAddr;
use std::time::Duration;

/// Browser origin of the companion front end
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// HTTP API for seolens
#[derive(Debug, Clone, Parser)]
#[command(name = "seolens-server", version, about)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "SEOLENS_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// The single origin allowed by CORS
    #[arg(long, env = "SEOLENS_ALLOWED_ORIGIN", default_value = DEFAULT_ALLOWED_ORIGIN)]
    pub allowed_origin: String,

    #[arg(long, env = "SEOLENS_CACHE_TTL_SECS", default_value_t = DEFAULT_TTL.as_secs())]
    pub cache_ttl_secs: u64,

    #[arg(long, env = "SEOLENS_CACHE_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub cache_capacity: usize,

    /// Overall deadline for one fetch, redirects and body included
    #[arg(long, env = "SEOLENS_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub fetch_timeout_secs: u64,

    #[arg(long, env = "SEOLENS_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// User-Agent sent with every fetch
    #[arg(long, env = "SEOLENS_USER_AGENT")]
    pub user_agent: Option<String>,

    #[arg(long, env = "SEOLENS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl ServerConfig {
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(self.fetch_timeout_secs),
            max_body_bytes: self.max_body_bytes,
            user_agent: self.user_agent.clone().unwrap_or_else(default_user_agent),
            ..FetchConfig::default()
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache_ttl_secs),
            capacity: self.cache_capacity,
        }
    }
}
