// src/handlers/health.rs
use std::convert::Infallible;
use warp::reply::Json;

pub async fn get_health() -> Result<Json, Infallible> {
    Ok(warp::reply::json(&serde_json::json!({ "status": "ok" })))
}
