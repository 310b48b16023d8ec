use anyhow::Context;
use dotenv::dotenv;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use nse_returns_analyzer::config::AppConfig;
use nse_returns_analyzer::handlers::ShellDefaults;
use nse_returns_analyzer::routes;
use nse_returns_analyzer::services::cache::InMemoryCache;
use nse_returns_analyzer::services::pipeline::Dashboard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!("Using PORT: {}", config.port);
    info!(
        "Data source: {:?}, defaults: {} ({})",
        config.data_source, config.default_symbol, config.default_period
    );

    // Bind to 0.0.0.0 so the dashboard is reachable from outside a container
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    let source = config.build_source().context("failed to set up data source")?;
    let dashboard = Arc::new(Dashboard::new(source, InMemoryCache::new()));
    let defaults = ShellDefaults {
        symbol: config.default_symbol.clone(),
        period: config.default_period,
    };

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    // Set up routes
    let api = routes::routes(dashboard, defaults).with(cors);
    info!("Routes configured successfully with CORS.");

    // Start the server
    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;

    Ok(())
}
