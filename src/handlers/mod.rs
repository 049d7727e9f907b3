//! HTTP request handlers for the medrelay API

use crate::completion::CompletionClient;
use crate::config::{ApiKey, Config, ServerConfig};
use crate::error::{AppError, AppResult};
use crate::middleware::request_id_middleware;
use crate::relay::QueryRelay;
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod health;
pub mod query;

/// Application state shared across all handlers
///
/// All fields are Arc'd for cheap cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    relay: Arc<QueryRelay>,
}

impl AppState {
    /// Create a new AppState from configuration and a resolved API key
    pub fn new(config: Config, api_key: ApiKey) -> AppResult<Self> {
        let client = CompletionClient::new(&config.upstream, api_key)?;
        let relay = QueryRelay::new(client, &config.upstream);

        Ok(Self {
            config: Arc::new(config),
            relay: Arc::new(relay),
        })
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get reference to the query relay
    pub fn relay(&self) -> &QueryRelay {
        &self.relay
    }
}

/// Build the CORS layer from `server.cors_allowed_origins`
pub fn cors_layer(server: &ServerConfig) -> AppResult<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if server.cors_allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = server
        .cors_allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| {
                AppError::Config(format!("Invalid CORS origin: '{}'", origin))
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Build the application router with all routes and middleware
pub fn router(state: AppState) -> AppResult<Router> {
    let cors = cors_layer(&state.config().server)?;

    Ok(Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::handler))
        .route("/upload_and_query", post(query::handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state))
}
