use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::lunar::{MAX_YEAR, MIN_YEAR};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    /// Lunar years the conversion tables cover.
    pub supported_years: [i32; 2],
}

pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        supported_years: [MIN_YEAR, MAX_YEAR],
    };

    (StatusCode::OK, Json(response))
}
