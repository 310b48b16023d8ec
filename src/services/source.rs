// src/services/source.rs
use std::fmt;
use std::future::Future;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Period, PriceSeries};
use crate::services::csv_source::CsvSource;
use crate::services::yahoo::YahooSource;

#[derive(Debug)]
pub enum FetchError {
    InvalidSymbol(String),
    NotFound(String),
    Upstream { status: u16, message: String },
    Http(reqwest::Error),
    Payload(String),
    Io(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::InvalidSymbol(symbol) => write!(f, "invalid ticker symbol '{}'", symbol),
            FetchError::NotFound(symbol) => write!(f, "no price data found for '{}'", symbol),
            FetchError::Upstream { status, message } => {
                write!(f, "data source answered {}: {}", status, message)
            }
            FetchError::Http(e) => write!(f, "http error: {}", e),
            FetchError::Payload(msg) => write!(f, "unexpected payload: {}", msg),
            FetchError::Io(e) => write!(f, "io error: {}", e),
            FetchError::Csv(e) => write!(f, "csv error: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// True when the source answered but its data could not be read. The other
    /// variants mean the symbol could not be resolved or the source not reached.
    pub fn is_fault(&self) -> bool {
        matches!(self, FetchError::Payload(_) | FetchError::Io(_) | FetchError::Csv(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Http(err)
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Io(err)
    }
}

impl From<csv::Error> for FetchError {
    fn from(err: csv::Error) -> Self {
        FetchError::Csv(err)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Payload(err.to_string())
    }
}

/// Anything that can produce daily closes for a symbol over a lookback period.
pub trait PriceSource: Send + Sync {
    /// Shown in the success banner, e.g. "Yahoo Finance".
    fn name(&self) -> &str;

    fn fetch(
        &self,
        symbol: &str,
        period: Period,
    ) -> impl Future<Output = Result<PriceSeries, FetchError>> + Send;
}

/// Source picked at startup from configuration.
pub enum AnySource {
    Yahoo(YahooSource),
    Csv(CsvSource),
}

impl PriceSource for AnySource {
    fn name(&self) -> &str {
        match self {
            AnySource::Yahoo(source) => source.name(),
            AnySource::Csv(source) => source.name(),
        }
    }

    async fn fetch(&self, symbol: &str, period: Period) -> Result<PriceSeries, FetchError> {
        match self {
            AnySource::Yahoo(source) => source.fetch(symbol, period).await,
            AnySource::Csv(source) => source.fetch(symbol, period).await,
        }
    }
}

static SYMBOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9^][A-Z0-9.\-=^&]{0,19}$").unwrap());

/// Trims and upper-cases a ticker, rejecting anything that is not a plausible symbol
/// such as `RELIANCE.NS`, `^NSEI`, `BRK-B` or `EURUSD=X`.
pub fn normalize_symbol(raw: &str) -> Result<String, FetchError> {
    let symbol = raw.trim().to_uppercase();
    if SYMBOL_PATTERN.is_match(&symbol) {
        Ok(symbol)
    } else {
        Err(FetchError::InvalidSymbol(raw.to_string()))
    }
}
