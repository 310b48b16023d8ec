// src/handlers/returns.rs
use std::sync::Arc;

use log::{error, info};
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::{AnalyzeQuery, ShellDefaults};
use crate::services::cache::PriceCache;
use crate::services::pipeline::{Dashboard, RunOutcome};
use crate::services::source::PriceSource;

pub async fn get_returns<S, C>(
    query: AnalyzeQuery,
    dashboard: Arc<Dashboard<S, C>>,
    defaults: Arc<ShellDefaults>,
) -> Result<Json, Rejection>
where
    S: PriceSource,
    C: PriceCache,
{
    let symbol = query.symbol_or(&defaults);
    let period = query
        .period_or(&defaults)
        .map_err(|e| warp::reject::custom(ApiError::bad_request(e.to_string())))?;
    info!("Handling request to get returns for {} ({})", symbol, period);

    match dashboard.run(&symbol, period).await {
        RunOutcome::Report(report) => Ok(warp::reply::json(&report)),
        RunOutcome::NoData { symbol, period } => {
            error!("No price data available for {} ({})", symbol, period);
            Err(warp::reject::custom(ApiError::no_data(format!(
                "Failed to fetch data for {} ({}). Please check the ticker symbol or your internet connection.",
                symbol, period
            ))))
        }
        RunOutcome::Fault(message) => Err(warp::reject::custom(ApiError::internal(message))),
    }
}
