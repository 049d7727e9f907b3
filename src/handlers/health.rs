//! Liveness endpoints
//!
//! `GET /` answers the frontend's "is the backend up" check; `GET /health`
//! is a plain probe for monitoring and load balancers.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Message returned by `GET /`
pub const LIVENESS_MESSAGE: &str = "✅ AI Medical Chatbot Backend is running!";

/// Liveness response for `GET /`
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET / handler
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: LIVENESS_MESSAGE,
    })
}

/// GET /health handler
pub async fn handler() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: "OK" }))
}
