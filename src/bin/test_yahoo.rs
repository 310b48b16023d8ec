use dotenv::dotenv;
use log::{error, info};
use std::env;

use nse_returns_analyzer::config::AppConfig;
use nse_returns_analyzer::models::Period;
use nse_returns_analyzer::services::pipeline::analyze;
use nse_returns_analyzer::services::source::{normalize_symbol, PriceSource};
use nse_returns_analyzer::services::yahoo::YahooSource;
use nse_returns_analyzer::BoxError;

/// Usage: test_yahoo [SYMBOL] [PERIOD]
#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env()?;
    let mut args = env::args().skip(1);
    let symbol = normalize_symbol(&args.next().unwrap_or(config.default_symbol.clone()))?;
    let period = match args.next() {
        Some(raw) => raw.parse::<Period>()?,
        None => config.default_period,
    };

    info!("Testing Yahoo Finance daily closes for {} ({})...", symbol, period);

    let source = YahooSource::new(config.yahoo_base_url.clone(), config.http_timeout)?;
    let prices = match source.fetch(&symbol, period).await {
        Ok(prices) => prices,
        Err(e) => {
            error!("ERROR: Failed to fetch Yahoo Finance prices: {}", e);
            return Err(e.into());
        }
    };

    info!("SUCCESS: {} records", prices.len());
    if let (Some(first), Some(last)) = (prices.points().first(), prices.points().last()) {
        info!("  first: {} {:.2}", first.date, first.close);
        info!("  last:  {} {:.2}", last.date, last.close);
    }

    let report = analyze(&symbol, period, source.name(), &prices);
    for panel in &report.panels {
        let s = &panel.summary;
        println!(
            "{:<8} count={:<5} mean={:<12} std={:<12} min={:<12} max={:<12} curve_points={}",
            panel.granularity.label(),
            s.count,
            fmt_opt(s.mean),
            fmt_opt(s.std),
            fmt_opt(s.min),
            fmt_opt(s.max),
            panel.normal_curve.points.len()
        );
    }

    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.6}", v))
        .unwrap_or_else(|| "no data".to_string())
}
