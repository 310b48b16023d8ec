// src/services/yahoo.rs
use std::time::Duration;

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;

use crate::models::{Period, PricePoint, PriceSeries};
use crate::services::source::{FetchError, PriceSource};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Daily bars from the Yahoo Finance chart endpoint.
pub struct YahooSource {
    client: Client,
    base_url: String,
}

impl YahooSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(YahooSource {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.base_url,
            symbol.replace('^', "%5E").replace('&', "%26")
        )
    }
}

impl PriceSource for YahooSource {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn fetch(&self, symbol: &str, period: Period) -> Result<PriceSeries, FetchError> {
        let end = Utc::now();
        let start = period.start_from(end);
        let url = self.chart_url(symbol);
        info!("Fetching {} daily closes for {} from {}", period, symbol, url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", start.timestamp().to_string()),
                ("period2", end.timestamp().to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Yahoo answered {} with {} bytes", status, body.len());

        if !status.is_success() {
            let message = serde_json::from_str::<ChartEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.chart.error)
                .map(|e| e.description)
                .unwrap_or_else(|| "no error description".to_string());
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let series = parse_chart(symbol, &body)?;
        info!("Parsed {} daily closes for {}", series.len(), symbol);
        Ok(series)
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "exchangeTimezoneName")]
    exchange_timezone_name: Option<String>,
    #[serde(rename = "gmtoffset")]
    gmt_offset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Turns a chart payload into daily closes. Adjusted closes win over raw closes
/// when Yahoo sends them; sessions with a null close are skipped.
fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries, FetchError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.chart.error {
        return Err(FetchError::Upstream {
            status: 200,
            message: format!("{}: {}", error.code, error.description),
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FetchError::NotFound(symbol.to_string()))?;

    let closes = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .filter(|closes| !closes.is_empty())
        .or_else(|| result.indicators.quote.into_iter().next().map(|q| q.close))
        .unwrap_or_default();

    if closes.len() != result.timestamp.len() {
        return Err(FetchError::Payload(format!(
            "{} timestamps but {} closes",
            result.timestamp.len(),
            closes.len()
        )));
    }

    let to_date = exchange_date_fn(&result.meta);
    let mut points = Vec::with_capacity(closes.len());
    for (ts, close) in result.timestamp.iter().zip(closes) {
        if let (Some(date), Some(close)) = (to_date(*ts), close) {
            points.push(PricePoint { date, close });
        }
    }

    Ok(PriceSeries::from_points(points))
}

/// Trading dates are taken in the exchange's own timezone so a session that
/// opens before midnight UTC keeps its local date.
fn exchange_date_fn(meta: &ChartMeta) -> Box<dyn Fn(i64) -> Option<NaiveDate>> {
    if let Some(tz) = meta
        .exchange_timezone_name
        .as_deref()
        .and_then(|name| name.parse::<Tz>().ok())
    {
        return Box::new(move |ts| tz.timestamp_opt(ts, 0).single().map(|dt| dt.date_naive()));
    }

    if let Some(offset) = meta.gmt_offset.and_then(FixedOffset::east_opt) {
        return Box::new(move |ts| offset.timestamp_opt(ts, 0).single().map(|dt| dt.date_naive()));
    }

    Box::new(|ts| Utc.timestamp_opt(ts, 0).single().map(|dt| dt.date_naive()))
}
