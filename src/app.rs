use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value};

use crate::api;
use crate::store::Store;

async fn root() -> Json<Value> {
    Json(json!({"message": "No Emo Vibe API Server", "status": "running"}))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Builds the HTTP router around an already-migrated store.
pub fn app(store: Store, cors_origin: Option<HeaderValue>) -> Router {
    let api_routes = Router::new()
        .route("/users/register", post(api::device::register_device))
        .route(
            "/diary/entries",
            get(api::diary::get_diary_entries).post(api::diary::create_diary_entry),
        )
        .route(
            "/diary/entries/:entry_uuid",
            put(api::diary::update_diary_entry).patch(api::diary::update_diary_entry),
        );

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(Extension(store))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    // "METHOD /path", e.g. "POST /api/diary/entries"
                    let span_name = if let Some(path) = matched_path {
                        format!("{} {}", request.method(), path)
                    } else {
                        format!("{} {}", request.method(), request.uri().path())
                    };

                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        // Filled in by handlers
                        table = tracing::field::Empty,
                        action = tracing::field::Empty,
                        device_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        entry_uuid = tracing::field::Empty,
                        business_event = tracing::field::Empty,
                        error = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(|_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {})
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));
                        tracing::info!("request completed");
                    },
                ),
        );

    match cors_origin {
        Some(origin) => router.layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        ),
        None => router,
    }
}
