// src/handlers/dashboard.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::{info, warn};
use warp::http::StatusCode;
use warp::Reply;

use super::{AnalyzeQuery, ShellDefaults};
use crate::services::cache::PriceCache;
use crate::services::pipeline::{Dashboard, RunOutcome};
use crate::services::render::{render_page, PageBody, PageView};
use crate::services::source::PriceSource;

/// The HTML dashboard. Every outcome is a rendered page; the status code tells
/// clients whether the run produced a report.
pub async fn get_dashboard<S, C>(
    query: AnalyzeQuery,
    dashboard: Arc<Dashboard<S, C>>,
    defaults: Arc<ShellDefaults>,
) -> Result<impl Reply, Infallible>
where
    S: PriceSource,
    C: PriceCache,
{
    let symbol = query.symbol_or(&defaults);
    info!("Handling dashboard request for {}", symbol);

    let period = match query.period_or(&defaults) {
        Ok(period) => period,
        Err(e) => {
            warn!("Rejecting dashboard request: {}", e);
            let message = e.to_string();
            let page = render_page(&PageView {
                symbol: &symbol,
                period: defaults.period,
                body: PageBody::Error(&message),
            });
            return Ok(warp::reply::with_status(warp::reply::html(page), StatusCode::BAD_REQUEST));
        }
    };

    let (page, status) = match dashboard.run(&symbol, period).await {
        RunOutcome::Report(report) => {
            let page = render_page(&PageView {
                symbol: &symbol,
                period,
                body: PageBody::Report(&report),
            });
            (page, StatusCode::OK)
        }
        RunOutcome::NoData { .. } => {
            let page = render_page(&PageView {
                symbol: &symbol,
                period,
                body: PageBody::NoData,
            });
            (page, StatusCode::NOT_FOUND)
        }
        RunOutcome::Fault(message) => {
            let page = render_page(&PageView {
                symbol: &symbol,
                period,
                body: PageBody::Error(&message),
            });
            (page, StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    Ok(warp::reply::with_status(warp::reply::html(page), status))
}
