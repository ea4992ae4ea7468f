use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::alerts::{MatchingSettings, RenotifyPolicy};

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
    pub matching: MatchingSettings,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            matching: load_matching_settings()?,
        })
    }
}

fn load_matching_settings() -> Result<MatchingSettings, ConfigError> {
    let defaults = MatchingSettings::default();

    let page_size = match env::var("ALERTS_PAGE_SIZE") {
        Ok(raw) => parse_positive(&raw).ok_or(ConfigError::InvalidPageSize)?,
        Err(_) => defaults.page_size,
    };

    let soft_deadline = match env::var("ALERTS_SOFT_DEADLINE_SECS") {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(0) => None,
            Ok(secs) => Some(Duration::from_secs(secs)),
            Err(_) => return Err(ConfigError::InvalidDeadline),
        },
        Err(_) => defaults.soft_deadline,
    };

    let renotify = match env::var("ALERTS_RENOTIFY") {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "always" => RenotifyPolicy::Always,
            "never" => RenotifyPolicy::Never,
            _ => return Err(ConfigError::InvalidRenotifyPolicy { value: raw }),
        },
        Err(_) => defaults.renotify,
    };

    let dispatch_queue_capacity = match env::var("ALERTS_DISPATCH_QUEUE") {
        Ok(raw) => parse_positive(&raw).ok_or(ConfigError::InvalidQueueCapacity)?,
        Err(_) => defaults.dispatch_queue_capacity,
    };

    Ok(MatchingSettings {
        page_size,
        soft_deadline,
        renotify,
        dispatch_queue_capacity,
    })
}

fn parse_positive(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|value| *value > 0)
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPageSize,
    InvalidDeadline,
    InvalidRenotifyPolicy { value: String },
    InvalidQueueCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPageSize => {
                write!(f, "ALERTS_PAGE_SIZE must be a positive integer")
            }
            ConfigError::InvalidDeadline => {
                write!(f, "ALERTS_SOFT_DEADLINE_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidRenotifyPolicy { value } => {
                write!(f, "ALERTS_RENOTIFY must be 'always' or 'never' (found '{value}')")
            }
            ConfigError::InvalidQueueCapacity => {
                write!(f, "ALERTS_DISPATCH_QUEUE must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
