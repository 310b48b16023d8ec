// src/services/csv_source.rs
use std::io::{ErrorKind, Read};
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use csv::Reader;
use log::{debug, info};

use crate::models::{Period, PricePoint, PriceSeries};
use crate::services::source::{FetchError, PriceSource};

/// Reads `<SYMBOL>.csv` files exported in the Yahoo history layout
/// (`Date,Open,High,Low,Close,Adj Close,Volume`). Only `Date` and one of the
/// close columns are required.
pub struct CsvSource {
    data_dir: PathBuf,
}

impl CsvSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        CsvSource {
            data_dir: data_dir.into(),
        }
    }
}

impl PriceSource for CsvSource {
    fn name(&self) -> &str {
        "local CSV files"
    }

    async fn fetch(&self, symbol: &str, period: Period) -> Result<PriceSeries, FetchError> {
        let path = self.data_dir.join(format!("{}.csv", symbol));
        info!("Loading {} closes for {} from {}", period, symbol, path.display());

        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FetchError::NotFound(symbol.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let points = parse_price_csv(text.as_bytes())?;
        let series = PriceSeries::from_points(points);
        Ok(trim_to_period(series, period))
    }
}

pub fn parse_price_csv<R: Read>(reader: R) -> Result<Vec<PricePoint>, FetchError> {
    let mut rdr = Reader::from_reader(reader);

    let headers = rdr.headers()?.clone();
    let idx_date = headers
        .iter()
        .position(|h| h.trim() == "Date")
        .ok_or_else(|| FetchError::Payload("no 'Date' column in CSV".to_string()))?;
    let idx_close = headers
        .iter()
        .position(|h| h.trim() == "Adj Close")
        .or_else(|| headers.iter().position(|h| h.trim() == "Close"))
        .ok_or_else(|| FetchError::Payload("no 'Close' column in CSV".to_string()))?;

    let mut points = Vec::new();
    for record in rdr.records() {
        let row = record?;
        let date_cell = row.get(idx_date).unwrap_or("").trim();
        let close_cell = row.get(idx_close).unwrap_or("").trim();

        // Yahoo writes "null" for sessions without a close.
        if close_cell.is_empty() || close_cell.eq_ignore_ascii_case("null") {
            debug!("Skipping row {} without a close", date_cell);
            continue;
        }

        let date = NaiveDate::parse_from_str(date_cell, "%Y-%m-%d")
            .map_err(|e| FetchError::Payload(format!("bad date '{}': {}", date_cell, e)))?;
        let close = close_cell
            .parse::<f64>()
            .map_err(|e| FetchError::Payload(format!("bad close '{}': {}", close_cell, e)))?;
        points.push(PricePoint { date, close });
    }

    Ok(points)
}

/// Keeps the lookback window that ends at the newest row of the file.
fn trim_to_period(series: PriceSeries, period: Period) -> PriceSeries {
    let last = match series.points().last() {
        Some(last) => last.date,
        None => return series,
    };

    let end = last.and_time(NaiveTime::default()).and_utc();
    let start = period.start_from(end).date_naive();
    PriceSeries::from_points(
        series
            .points()
            .iter()
            .copied()
            .filter(|p| p.date >= start)
            .collect(),
    )
}
