use axum::{middleware, routing::get, Router};
use domain::services::LogStore;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{health, locations, logs};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LogStore>,
    pub config: Arc<Config>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        layer.allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn create_app(config: Config, store: Arc<dyn LogStore>) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        store,
        config: config.clone(),
    };

    let log_routes = Router::new()
        .route("/api/v1/locations", get(locations::list_locations))
        .route(
            "/api/v1/logs",
            get(logs::list_logs).post(logs::create_logs),
        )
        .route(
            "/api/v1/logs/:log_id",
            get(logs::get_log)
                .put(logs::update_log)
                .post(logs::update_log)
                .delete(logs::delete_log),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(log_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
