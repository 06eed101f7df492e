//! HTTP router and middleware stack.

use crate::config::Config;
use crate::handlers::{self, AppState, INGEST_SECRET_HEADER};
use axum::{
    http::{header::CONTENT_TYPE, HeaderName, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Request size limit for API routes.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Builds the full application router.
///
/// `/health` sits outside the body limit and rate limiter. Only `/ingest`
/// answers cross-origin requests, since it is posted to from customer sites.
pub fn build_router(state: Arc<AppState>) -> Router {
    let ingest_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(INGEST_SECRET_HEADER)]);

    let api_routes = Router::new()
        .route("/leads", post(handlers::create_lead))
        .route("/ingest", post(handlers::ingest).layer(ingest_cors))
        .route("/contact", post(handlers::contact))
        .route("/onboarding", post(handlers::onboarding))
        .route("/settings", post(handlers::settings))
        .route("/dashboard", get(handlers::dashboard))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    let api_routes = with_rate_limit(api_routes, &state.config);

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Per-IP rate limiting; a per-second value of 0 disables it.
fn with_rate_limit(router: Router<Arc<AppState>>, config: &Config) -> Router<Arc<AppState>> {
    if config.rate_limit_per_second == 0 {
        tracing::debug!("Rate limiting disabled");
        return router;
    }

    let Some(governor_conf) = GovernorConfigBuilder::default()
        .per_second(config.rate_limit_per_second)
        .burst_size(config.rate_limit_burst)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
    else {
        tracing::warn!(
            "Invalid rate limit settings ({} req/s, burst {}); rate limiting disabled",
            config.rate_limit_per_second,
            config.rate_limit_burst
        );
        return router;
    };

    tracing::info!(
        "Rate limiting: {} req/s per IP, burst of {}",
        config.rate_limit_per_second,
        config.rate_limit_burst
    );

    router.layer(GovernorLayer {
        config: Arc::new(governor_conf),
    })
}
