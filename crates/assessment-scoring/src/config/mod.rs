use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::scaled_score::{CatalogError, SectionCatalog};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub catalog: CatalogConfig,
    pub sessions: SessionConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let section_catalog = env::var("APP_SECTION_CATALOG")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let idle_timeout_secs = env::var("APP_SESSION_IDLE_SECS")
            .unwrap_or_else(|_| DEFAULT_SESSION_IDLE_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidSessionIdle)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            catalog: CatalogConfig { section_catalog },
            sessions: SessionConfig { idle_timeout_secs },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the read-only section catalog comes from.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub section_catalog: Option<PathBuf>,
}

impl CatalogConfig {
    /// Load the configured catalog file, or the built-in sections when none is set.
    pub fn load_catalog(&self) -> Result<SectionCatalog, CatalogError> {
        match &self.section_catalog {
            Some(path) => SectionCatalog::from_path(path),
            None => Ok(SectionCatalog::standard()),
        }
    }
}

const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// Lifetime of editing sessions nobody closed explicitly.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sessions untouched for longer than this are evicted.
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: DEFAULT_SESSION_IDLE_SECS,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidSessionIdle,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidSessionIdle => {
                write!(f, "APP_SESSION_IDLE_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidSessionIdle => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_SECTION_CATALOG");
        env::remove_var("APP_SESSION_IDLE_SECS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.catalog.section_catalog.is_none());
        assert_eq!(config.sessions.idle_timeout_secs, 1800);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PORT", "eighty");
        let error = AppConfig::load().expect_err("port must be numeric");
        assert!(matches!(error, ConfigError::InvalidPort));
        reset_env();
    }

    #[test]
    fn blank_catalog_path_falls_back_to_standard_sections() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SECTION_CATALOG", "   ");
        let config = AppConfig::load().expect("config loads");
        assert!(config.catalog.section_catalog.is_none());
        let catalog = config.catalog.load_catalog().expect("standard catalog");
        assert_eq!(catalog.sections().len(), 8);
        reset_env();
    }

    #[test]
    fn session_idle_timeout_reads_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SESSION_IDLE_SECS", "90");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.sessions.idle_timeout_secs, 90);

        env::set_var("APP_SESSION_IDLE_SECS", "soon");
        let error = AppConfig::load().expect_err("timeout must be numeric");
        assert!(matches!(error, ConfigError::InvalidSessionIdle));
        reset_env();
    }
}
