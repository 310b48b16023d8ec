// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::{error, info};
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::dashboard::get_dashboard;
use crate::handlers::error::ApiError;
use crate::handlers::health::get_health;
use crate::handlers::returns::get_returns;
use crate::handlers::{AnalyzeQuery, ShellDefaults};
use crate::services::cache::PriceCache;
use crate::services::pipeline::Dashboard;
use crate::services::source::PriceSource;

// Add recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        code = StatusCode::BAD_REQUEST;
        message = e.to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        error!("Unhandled rejection: {:?}", err);
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes<S, C>(
    dashboard: Arc<Dashboard<S, C>>,
    defaults: ShellDefaults,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone
where
    S: PriceSource + 'static,
    C: PriceCache + 'static,
{
    info!("Configuring routes...");

    let dashboard_filter = warp::any().map(move || dashboard.clone());
    let defaults = Arc::new(defaults);
    let defaults_filter = warp::any().map(move || defaults.clone());

    let page_route = warp::path::end()
        .and(warp::get())
        .and(warp::query::<AnalyzeQuery>())
        .and(dashboard_filter.clone())
        .and(defaults_filter.clone())
        .and_then(get_dashboard::<S, C>);

    let returns_route = warp::path!("api" / "v1" / "returns")
        .and(warp::get())
        .and(warp::query::<AnalyzeQuery>())
        .and(dashboard_filter.clone())
        .and(defaults_filter.clone())
        .and_then(get_returns::<S, C>);

    let health_route = warp::path!("health")
        .and(warp::get())
        .and_then(get_health);

    info!("All routes configured successfully.");

    page_route
        .or(returns_route)
        .or(health_route)
        .recover(handle_rejection)
}
