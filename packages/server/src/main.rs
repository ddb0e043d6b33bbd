use axum::http::{self, HeaderName, HeaderValue, Method};
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use contaminados_server::{app, utils::config::CONFIG};

// Logging
fn init_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("contaminados_server=debug,tower_http=debug,axum=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    let dotenv_result = dotenv();

    init_logger();
    if let Err(e) = dotenv_result {
        tracing::warn!("could not load .env file: {}", e);
    }

    let origins = CONFIG
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::HEAD,
        ])
        .allow_headers([
            http::header::CONTENT_TYPE,
            HeaderName::from_static("player"),
            HeaderName::from_static("password"),
        ])
        .expose_headers([HeaderName::from_static("x-msg")]);

    let app = app::create_app().layer(cors).layer(
        TraceLayer::new_for_http().make_span_with(|request: &http::Request<_>| {
            tracing::info_span!(
                "HTTP request",
                method = %request.method(),
                uri = %request.uri(),
            )
        }),
    );

    let addr = CONFIG.bind_addr;
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
