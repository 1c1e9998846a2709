use axum::{
    extract::MatchedPath,
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::{
    handlers, metrics, metrics_handler,
    state::AppState,
    validation::{Aadhaar, Other, Pan, Passport, Vaccine},
};

pub fn observability_routes() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics_handler::metrics_endpoint))
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
}

pub fn application_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/applications/:application_id/passport",
            put(handlers::put_document::<Passport>),
        )
        .route(
            "/applications/:application_id/aadhaar",
            put(handlers::put_document::<Aadhaar>),
        )
        .route(
            "/applications/:application_id/pan",
            put(handlers::put_document::<Pan>),
        )
        .route(
            "/applications/:application_id/vaccine",
            put(handlers::put_document::<Vaccine>),
        )
        .route(
            "/applications/:application_id/other",
            put(handlers::put_document::<Other>),
        )
}

/// Full application router with middleware and fallback
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(application_routes())
        .merge(observability_routes())
        .fallback(handlers::route_not_found)
        .layer(middleware::from_fn(request_logger))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn request_logger(
    req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> axum::response::Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = std::time::Instant::now();

    let response = next.run(req).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    metrics::observe_http(method.as_str(), &path, status, elapsed.as_secs_f64());

    tracing::info!("{method} {uri} {status} {}ms", elapsed.as_millis());

    response
}
