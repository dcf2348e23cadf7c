use axum::{http::HeaderValue, routing::get};
use noemovibe_server::{Config, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    noemovibe_server::telemetry::init_telemetry("noemovibe-server")?;

    let config = Config::from_env()?;
    let cors_origin = config
        .cors_allowed_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()?;

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    let store = Store::connect(&config).await?;
    store.migrate().await?;

    noemovibe_server::metrics::init_metrics(store.connection()).await;

    let app = noemovibe_server::app(store, cors_origin)
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
