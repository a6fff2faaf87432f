//! Health check endpoint.

use actix_web::HttpResponse;
use chrono::Utc;
use serde::Serialize;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

/// Health check endpoint. Exempt from authentication; returns 200 whenever
/// the service is running.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}
