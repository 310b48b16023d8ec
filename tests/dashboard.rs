mod common;

use std::time::Duration;

use common::{calls, daily_prices, wavy_prices, FakeSource};
use nse_returns_analyzer::models::{Granularity, Period, PriceSeries};
use nse_returns_analyzer::services::cache::{CacheKey, InMemoryCache, PriceCache};
use nse_returns_analyzer::services::pipeline::{Dashboard, RunOutcome};

fn report_of(outcome: RunOutcome) -> nse_returns_analyzer::models::ReturnsReport {
    match outcome {
        RunOutcome::Report(report) => report,
        RunOutcome::NoData { symbol, .. } => panic!("expected a report for {}", symbol),
        RunOutcome::Fault(message) => panic!("expected a report, got fault: {}", message),
    }
}

#[tokio::test]
async fn worked_example_runs_end_to_end() {
    let (source, _) = FakeSource::new();
    let source = source.with("TEST.NS", daily_prices(&[100.0, 110.0, 99.0]));
    let dashboard = Dashboard::new(source, InMemoryCache::new());

    let report = report_of(dashboard.run("test.ns", Period::OneYear).await);
    assert_eq!(report.symbol, "TEST.NS");
    assert_eq!(report.record_count, 3);
    assert_eq!(report.source, "fake feed");

    let daily = &report.panels[0];
    assert_eq!(daily.granularity, Granularity::Daily);
    assert_eq!(daily.summary.count, 2);
    let values = daily.returns.values();
    assert!((values[0] - 0.10).abs() < 1e-12);
    assert!((values[1] + 0.118181818).abs() < 1e-8);
    assert!((daily.summary.mean.unwrap() + 0.009090909).abs() < 1e-8);
}

#[tokio::test]
async fn unknown_symbol_stops_the_run() {
    let (source, counter) = FakeSource::new();
    let dashboard = Dashboard::new(source, InMemoryCache::new());

    let outcome = dashboard.run("MISSING.NS", Period::SixMonths).await;
    assert_eq!(
        outcome,
        RunOutcome::NoData {
            symbol: "MISSING.NS".to_string(),
            period: Period::SixMonths
        }
    );
    assert_eq!(calls(&counter), 1);
    assert!(dashboard.fetcher().cache().is_empty());
}

#[tokio::test]
async fn empty_series_stops_the_run_and_is_not_cached() {
    let (source, counter) = FakeSource::new();
    let source = source.with("EMPTY.NS", PriceSeries::empty());
    let dashboard = Dashboard::new(source, InMemoryCache::new());

    for _ in 0..2 {
        assert!(matches!(
            dashboard.run("EMPTY.NS", Period::OneYear).await,
            RunOutcome::NoData { .. }
        ));
    }
    assert_eq!(calls(&counter), 2);
}

#[tokio::test]
async fn invalid_symbol_never_reaches_the_source() {
    let (source, counter) = FakeSource::new();
    let dashboard = Dashboard::new(source, InMemoryCache::new());

    let outcome = dashboard.run("../../etc", Period::OneYear).await;
    assert!(matches!(outcome, RunOutcome::NoData { .. }));
    assert_eq!(calls(&counter), 0);
}

#[tokio::test]
async fn single_price_gives_empty_panels() {
    let (source, _) = FakeSource::new();
    let source = source.with("ONE.NS", daily_prices(&[250.0]));
    let dashboard = Dashboard::new(source, InMemoryCache::new());

    let report = report_of(dashboard.run("ONE.NS", Period::OneYear).await);
    assert_eq!(report.record_count, 1);
    for panel in &report.panels {
        assert_eq!(panel.summary.count, 0);
        assert_eq!(panel.summary.mean, None);
        assert_eq!(panel.summary.std, None);
        assert!(!panel.normal_curve.is_plottable());
    }
}

#[tokio::test]
async fn identical_requests_reuse_the_cached_fetch() {
    let (source, counter) = FakeSource::new();
    let source = source.with("WAVY.NS", wavy_prices());
    let dashboard = Dashboard::new(source, InMemoryCache::new());

    let first = report_of(dashboard.run("WAVY.NS", Period::OneYear).await);
    let second = report_of(dashboard.run("wavy.ns", Period::OneYear).await);
    assert_eq!(calls(&counter), 1);
    assert_eq!(first, second);

    dashboard.run("WAVY.NS", Period::FiveYears).await;
    assert_eq!(calls(&counter), 2);
    assert!(dashboard
        .fetcher()
        .cache()
        .get(&CacheKey::new("WAVY.NS", Period::FiveYears))
        .is_some());
}

#[tokio::test]
async fn weekly_and_monthly_panels_cover_the_window() {
    let (source, _) = FakeSource::new();
    let source = source.with("WAVY.NS", wavy_prices());
    let dashboard = Dashboard::new(source, InMemoryCache::new());

    let report = report_of(dashboard.run("WAVY.NS", Period::OneYear).await);
    let weekly = &report.panels[1];
    let monthly = &report.panels[2];

    // 2024-01-01 (Mon) .. 2024-04-29 (Mon): 18 week ends, 4 month ends.
    assert_eq!(weekly.returns.len(), 17);
    assert_eq!(monthly.returns.len(), 3);
    assert_eq!(weekly.normal_curve.points.len(), 100);
    assert_eq!(monthly.normal_curve.points.len(), 100);

    let curve = &weekly.normal_curve.points;
    assert_eq!(curve.first().unwrap().x, weekly.summary.min.unwrap());
    assert_eq!(curve.last().unwrap().x, weekly.summary.max.unwrap());
}

#[tokio::test]
async fn concurrent_identical_runs_fetch_once() {
    let (source, counter) = FakeSource::new();
    let source = source
        .with("WAVY.NS", wavy_prices())
        .slow(Duration::from_millis(50));
    let dashboard = Dashboard::new(source, InMemoryCache::new());

    let (first, second) = tokio::join!(
        dashboard.run("WAVY.NS", Period::OneYear),
        dashboard.run("WAVY.NS", Period::OneYear)
    );

    assert_eq!(calls(&counter), 1);
    assert_eq!(report_of(first), report_of(second));
}

#[tokio::test]
async fn malformed_payload_is_reported_as_a_fault() {
    let (source, counter) = FakeSource::new();
    let source = source.malformed("RELIANCE.NS", "3 timestamps but 2 closes");
    let dashboard = Dashboard::new(source, InMemoryCache::new());

    match dashboard.run("RELIANCE.NS", Period::OneYear).await {
        RunOutcome::Fault(message) => {
            assert!(message.contains("RELIANCE.NS"));
            assert!(message.contains("3 timestamps but 2 closes"));
        }
        other => panic!("expected a fault, got {:?}", other),
    }
    assert_eq!(calls(&counter), 1);
    assert!(dashboard.fetcher().cache().is_empty());
}
