//! Configuration module

use std::env;
use std::net::SocketAddr;

use whispr_core::AssessmentConfig;

/// Default `RUST_LOG` when none is set
pub const DEFAULT_LOG_FILTER: &str = "whispr_server=debug,whispr_core=info,tower_http=debug";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind
    pub host: String,

    /// Server port
    pub port: u16,

    /// Emit JSON log lines instead of human readable ones
    pub log_json: bool,

    /// Assessment engine settings (`WHISPR_*`)
    pub assessment: AssessmentConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            log_json: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),

            assessment: AssessmentConfig::from_env(),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
