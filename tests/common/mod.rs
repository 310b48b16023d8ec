#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDate};
use nse_returns_analyzer::models::{Period, PricePoint, PriceSeries};
use nse_returns_analyzer::services::source::{FetchError, PriceSource};

/// Deterministic stand-in for the network data source.
pub struct FakeSource {
    series: HashMap<String, PriceSeries>,
    malformed: HashMap<String, String>,
    delay: Option<StdDuration>,
    calls: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = FakeSource {
            series: HashMap::new(),
            malformed: HashMap::new(),
            delay: None,
            calls: calls.clone(),
        };
        (source, calls)
    }

    pub fn with(mut self, symbol: &str, series: PriceSeries) -> Self {
        self.series.insert(symbol.to_string(), series);
        self
    }

    /// Answers `symbol` with a payload error carrying `message`.
    pub fn malformed(mut self, symbol: &str, message: &str) -> Self {
        self.malformed.insert(symbol.to_string(), message.to_string());
        self
    }

    /// Makes every fetch take `delay` before answering.
    pub fn slow(mut self, delay: StdDuration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl PriceSource for FakeSource {
    fn name(&self) -> &str {
        "fake feed"
    }

    async fn fetch(&self, symbol: &str, _period: Period) -> Result<PriceSeries, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.malformed.get(symbol) {
            return Err(FetchError::Payload(message.clone()));
        }
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(symbol.to_string()))
    }
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Consecutive calendar days starting 2024-01-01.
pub fn daily_prices(closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    PriceSeries::from_points(
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| PricePoint {
                date: start + Duration::days(i as i64),
                close: *close,
            })
            .collect(),
    )
}

/// Roughly four months of wobbling closes.
pub fn wavy_prices() -> PriceSeries {
    let closes: Vec<f64> = (0..120)
        .map(|i| 1000.0 + (i as f64 * 0.37).sin() * 25.0 + i as f64)
        .collect();
    daily_prices(&closes)
}
