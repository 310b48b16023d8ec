// src/services/pipeline.rs
use log::{error, info, warn};
use tokio::sync::Mutex;

use crate::models::{Granularity, Period, PriceSeries, ReturnSeries, ReturnsPanel, ReturnsReport};
use crate::services::cache::{CachedSource, PriceCache};
use crate::services::distribution::{
    fit_normal_curve, histogram, kernel_density, DENSITY_GRID_POINTS, HISTOGRAM_BINS,
    NORMAL_CURVE_POINTS,
};
use crate::services::returns::compute_returns;
use crate::services::source::PriceSource;
use crate::services::summary::summarize;

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Report(ReturnsReport),
    NoData { symbol: String, period: Period },
    /// The source answered with data that could not be read.
    Fault(String),
}

pub fn build_panel(granularity: Granularity, returns: ReturnSeries) -> ReturnsPanel {
    let values = returns.values();
    ReturnsPanel {
        granularity,
        summary: summarize(&returns),
        normal_curve: fit_normal_curve(&returns, NORMAL_CURVE_POINTS),
        histogram: histogram(&values, HISTOGRAM_BINS),
        density_estimate: kernel_density(&values, DENSITY_GRID_POINTS),
        returns,
    }
}

/// Pure part of a run: returns, statistics and curves for all three granularities.
pub fn analyze(symbol: &str, period: Period, source: &str, prices: &PriceSeries) -> ReturnsReport {
    let returns = compute_returns(prices);
    let panels = Granularity::ALL
        .iter()
        .map(|g| build_panel(*g, returns.get(*g).clone()))
        .collect();

    ReturnsReport {
        symbol: symbol.to_string(),
        period,
        record_count: prices.len(),
        source: source.to_string(),
        panels,
    }
}

/// Shared state behind the HTTP handlers. Runs are serialized so one
/// request's fetch and computation finish before the next starts.
pub struct Dashboard<S, C> {
    fetcher: CachedSource<S, C>,
    run_lock: Mutex<()>,
}

impl<S: PriceSource, C: PriceCache> Dashboard<S, C> {
    pub fn new(source: S, cache: C) -> Self {
        Dashboard {
            fetcher: CachedSource::new(source, cache),
            run_lock: Mutex::new(()),
        }
    }

    pub fn fetcher(&self) -> &CachedSource<S, C> {
        &self.fetcher
    }

    pub async fn run(&self, raw_symbol: &str, period: Period) -> RunOutcome {
        let _guard = self.run_lock.lock().await;
        let symbol = raw_symbol.trim().to_uppercase();
        info!("Starting run for {} ({})", symbol, period);

        let prices = match self.fetcher.fetch_or_empty(&symbol, period).await {
            Ok(prices) => prices,
            Err(e) => {
                error!("Run for {} ({}) failed: {}", symbol, period, e);
                return RunOutcome::Fault(format!(
                    "Failed to read data for {} ({}): {}",
                    symbol, period, e
                ));
            }
        };
        if prices.is_empty() {
            warn!("No data for {} ({}), stopping run", symbol, period);
            return RunOutcome::NoData { symbol, period };
        }

        let report = analyze(&symbol, period, self.fetcher.source_name(), &prices);
        info!(
            "Run for {} ({}) finished: {} records, {} daily / {} weekly / {} monthly returns",
            symbol,
            period,
            report.record_count,
            report.panels[0].returns.len(),
            report.panels[1].returns.len(),
            report.panels[2].returns.len()
        );
        RunOutcome::Report(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use chrono::NaiveDate;

    fn prices(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::from_points(
            closes
                .iter()
                .enumerate()
                .map(|(i, close)| PricePoint {
                    date: start + chrono::Duration::days(i as i64),
                    close: *close,
                })
                .collect(),
        )
    }

    #[test]
    fn single_price_gives_three_empty_panels() {
        let report = analyze("ONE.NS", Period::OneYear, "test", &prices(&[100.0]));
        assert_eq!(report.record_count, 1);
        assert_eq!(report.panels.len(), 3);
        for panel in &report.panels {
            assert!(panel.returns.is_empty());
            assert_eq!(panel.summary.count, 0);
            assert_eq!(panel.summary.mean, None);
            assert_eq!(panel.summary.std, None);
            assert!(!panel.normal_curve.is_plottable());
            assert!(panel.histogram.is_empty());
        }
    }

    #[test]
    fn panels_follow_granularity_order() {
        let report = analyze("X", Period::OneYear, "test", &prices(&[100.0, 110.0, 99.0]));
        let order: Vec<Granularity> = report.panels.iter().map(|p| p.granularity).collect();
        assert_eq!(order, Granularity::ALL.to_vec());

        let daily = &report.panels[0];
        assert_eq!(daily.summary.count, 2);
        assert!((daily.summary.mean.unwrap() + 0.0090909).abs() < 1e-6);
        assert_eq!(daily.normal_curve.points.len(), NORMAL_CURVE_POINTS);
    }

    #[test]
    fn analysis_is_idempotent() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let series = prices(&closes);
        assert_eq!(
            analyze("X", Period::OneYear, "test", &series),
            analyze("X", Period::OneYear, "test", &series)
        );
    }
}
