use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

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
    pub storage: StorageConfig,
    pub access: AccessConfig,
    pub notifier: NotifierConfig,
    pub media: MediaConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let database_url = optional_var("DATABASE_URL");
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5, |_| {
            ConfigError::InvalidNumber("DATABASE_MAX_CONNECTIONS")
        })?;

        let timeout_secs = parse_var("NOTIFY_TIMEOUT_SECS", 10, |_| {
            ConfigError::InvalidNumber("NOTIFY_TIMEOUT_SECS")
        })?;

        let public_base_url = optional_var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"));

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                database_url,
                max_connections,
            },
            access: AccessConfig {
                admin_token: optional_var("ADMIN_TOKEN"),
            },
            notifier: NotifierConfig {
                webhook_url: optional_var("NOTIFY_WEBHOOK_URL"),
                api_key: optional_var("NOTIFY_API_KEY"),
                admin_email: optional_var("ADMIN_EMAIL"),
                sender_name: optional_var("NOTIFY_FROM")
                    .unwrap_or_else(|| "Property Desk Website".to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
            media: MediaConfig {
                upload_dir: PathBuf::from(
                    optional_var("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()),
                ),
                public_base_url: public_base_url.trim_end_matches('/').to_string(),
            },
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T, F>(key: &'static str, default: T, on_error: F) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: FnOnce(T::Err) -> ConfigError,
{
    match optional_var(key) {
        Some(raw) => raw.parse::<T>().map_err(on_error),
        None => Ok(default),
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Storage backend selection. Without a database URL the in-memory store is used.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct AccessConfig {
    pub admin_token: Option<String>,
}

impl fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessConfig")
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Outbound lead notification relay.
#[derive(Clone)]
pub struct NotifierConfig {
    pub webhook_url: Option<String>,
    pub api_key: Option<String>,
    pub admin_email: Option<String>,
    pub sender_name: String,
    pub timeout: Duration,
}

impl fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("webhook_url", &self.webhook_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("admin_email", &self.admin_email)
            .field("sender_name", &self.sender_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub upload_dir: PathBuf,
    pub public_base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{0} must be a non-negative integer")]
    InvalidNumber(&'static str),
}
