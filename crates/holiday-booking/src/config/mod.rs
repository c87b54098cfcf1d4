use crate::workflows::booking::calendar::{SeasonError, SeasonWindow};
use crate::workflows::booking::session::StorefrontSettings;
use chrono::NaiveDate;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use url::Url;

const DEFAULT_SEASON_START: &str = "2025-11-20";
const DEFAULT_SEASON_END: &str = "2025-12-11";
const DEFAULT_AVAILABILITY_URL: &str = "https://docs.google.com/spreadsheets/d/1BT-ArD3fpR89wx66SeT4wFuUHWUe3_XJoKQvdT4jZsY/export?format=csv&gid=0";
const DEFAULT_WEBHOOK_URL: &str =
    "https://tagi.app.n8n.cloud/webhook/ad1dc79b-e77d-44e0-b233-2d78381beb4b";
const DEFAULT_PAYMENT_URL: &str = "https://square.link/u/gbJgBAFZ";

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
    pub booking: BookingConfig,
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
            booking: BookingConfig::from_env()?,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Season window, collaborator endpoints, and the copy shown to customers.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub season: SeasonWindow,
    pub availability_url: Url,
    pub webhook_url: Url,
    pub payment_url: Url,
    pub deposit_amount: String,
    pub price_per_foot: String,
    pub http_timeout: Duration,
    /// Sessions untouched for this long are forgotten.
    pub session_idle_timeout: Duration,
    pub max_sessions: usize,
}

impl BookingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| env::var(key).ok())
    }

    /// The built-in 2025 season settings, ignoring the environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::resolve(|_| None)
    }

    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let start = parse_date(&lookup, "BOOKING_SEASON_START", DEFAULT_SEASON_START)?;
        let end = parse_date(&lookup, "BOOKING_SEASON_END", DEFAULT_SEASON_END)?;
        let season = SeasonWindow::new(start, end).map_err(ConfigError::Season)?;

        let timeout_secs = lookup("BOOKING_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;
        let idle_secs = parse_positive(&lookup, "BOOKING_SESSION_IDLE_SECS", 1800)?;
        let max_sessions = parse_positive(&lookup, "BOOKING_MAX_SESSIONS", 10_000)?;

        Ok(Self {
            season,
            availability_url: parse_url(
                &lookup,
                "BOOKING_AVAILABILITY_URL",
                DEFAULT_AVAILABILITY_URL,
            )?,
            webhook_url: parse_url(&lookup, "BOOKING_WEBHOOK_URL", DEFAULT_WEBHOOK_URL)?,
            payment_url: parse_url(&lookup, "BOOKING_PAYMENT_URL", DEFAULT_PAYMENT_URL)?,
            deposit_amount: lookup("BOOKING_DEPOSIT_AMOUNT").unwrap_or_else(|| "$200".to_string()),
            price_per_foot: lookup("BOOKING_PRICE_PER_FOOT")
                .unwrap_or_else(|| "$5.50".to_string()),
            http_timeout: Duration::from_secs(timeout_secs),
            session_idle_timeout: Duration::from_secs(idle_secs),
            max_sessions,
        })
    }

    /// Shared client for the availability export and the webhook; the request
    /// timeout is the only time limit either call gets.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder().timeout(self.http_timeout).build()
    }

    pub fn storefront(&self) -> StorefrontSettings {
        StorefrontSettings {
            payment_url: self.payment_url.clone(),
            deposit_amount: self.deposit_amount.clone(),
            price_per_foot: self.price_per_foot.clone(),
        }
    }
}

fn parse_date(
    lookup: impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<NaiveDate, ConfigError> {
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate {
        key,
        value: raw,
    })
}

fn parse_positive<T>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .ok()
            .filter(|value| *value > T::default())
            .ok_or(ConfigError::InvalidSessionLimit { key, value: raw }),
    }
}

fn parse_url(
    lookup: impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<Url, ConfigError> {
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { key, source })
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidDate {
        key: &'static str,
        value: String,
    },
    InvalidUrl {
        key: &'static str,
        source: url::ParseError,
    },
    InvalidTimeout,
    InvalidSessionLimit {
        key: &'static str,
        value: String,
    },
    Season(SeasonError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDate { key, value } => {
                write!(f, "{key} must be a YYYY-MM-DD date (got '{value}')")
            }
            ConfigError::InvalidUrl { key, .. } => write!(f, "{key} must be an absolute URL"),
            ConfigError::InvalidTimeout => {
                write!(f, "BOOKING_HTTP_TIMEOUT_SECS must be a positive integer")
            }
            ConfigError::InvalidSessionLimit { key, value } => {
                write!(f, "{key} must be a positive integer (got '{value}')")
            }
            ConfigError::Season(err) => write!(f, "invalid booking season: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidDate { .. }
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidSessionLimit { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidUrl { source, .. } => Some(source),
            ConfigError::Season(err) => Some(err),
        }
    }
}
