// src/config.rs
use log::warn;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::Period;
use crate::services::csv_source::CsvSource;
use crate::services::source::{AnySource, FetchError};
use crate::services::yahoo::{YahooSource, DEFAULT_BASE_URL};

#[derive(Debug, Clone, PartialEq)]
pub enum DataSourceKind {
    Yahoo,
    Csv,
}

#[derive(Debug)]
pub enum ConfigError {
    UnknownDataSource(String),
    Source(FetchError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::UnknownDataSource(kind) => {
                write!(f, "DATA_SOURCE must be 'yahoo' or 'csv', got '{}'", kind)
            }
            ConfigError::Source(e) => write!(f, "failed to build data source: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<FetchError> for ConfigError {
    fn from(err: FetchError) -> Self {
        ConfigError::Source(err)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_source: DataSourceKind,
    pub csv_data_dir: PathBuf,
    pub yahoo_base_url: String,
    pub http_timeout: Duration,
    pub default_symbol: String,
    pub default_period: Period,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: 3030,
            data_source: DataSourceKind::Yahoo,
            csv_data_dir: PathBuf::from("data"),
            yahoo_base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(10),
            default_symbol: "RELIANCE.NS".to_string(),
            default_period: Period::OneYear,
        }
    }
}

impl AppConfig {
    /// Reads the process environment. Call `dotenv().ok()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Missing or malformed values fall back to the defaults with a warning;
    /// only an unknown `DATA_SOURCE` is fatal.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                warn!("PORT '{}' is not a number, defaulting to {}", raw, defaults.port);
                defaults.port
            }),
            None => {
                warn!("$PORT not set, defaulting to {}", defaults.port);
                defaults.port
            }
        };

        let data_source = match lookup("DATA_SOURCE").map(|s| s.trim().to_lowercase()) {
            None => DataSourceKind::Yahoo,
            Some(kind) if kind == "yahoo" => DataSourceKind::Yahoo,
            Some(kind) if kind == "csv" => DataSourceKind::Csv,
            Some(other) => return Err(ConfigError::UnknownDataSource(other)),
        };

        let http_timeout = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!("HTTP_TIMEOUT_SECS '{}' is invalid, defaulting to {:?}", raw, defaults.http_timeout);
                    defaults.http_timeout
                }
            },
            None => defaults.http_timeout,
        };

        let default_period = match lookup("DEFAULT_PERIOD") {
            Some(raw) => raw.parse::<Period>().unwrap_or_else(|e| {
                warn!("{}, defaulting to {}", e, defaults.default_period);
                defaults.default_period
            }),
            None => defaults.default_period,
        };

        Ok(AppConfig {
            port,
            data_source,
            csv_data_dir: lookup("CSV_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.csv_data_dir),
            yahoo_base_url: lookup("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
            http_timeout,
            default_symbol: lookup("DEFAULT_SYMBOL")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.default_symbol),
            default_period,
        })
    }

    pub fn build_source(&self) -> Result<AnySource, ConfigError> {
        Ok(match self.data_source {
            DataSourceKind::Yahoo => {
                AnySource::Yahoo(YahooSource::new(self.yahoo_base_url.clone(), self.http_timeout)?)
            }
            DataSourceKind::Csv => AnySource::Csv(CsvSource::new(self.csv_data_dir.clone())),
        })
    }
}
