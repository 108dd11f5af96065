use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use clap::Parser;
use common::{AppState, Config};
use database::Database;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod handlers;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load .env (if any) and config from CLI args / environment
    dotenvy::dotenv().ok();
    let config = Config::parse();

    // 2. Initialize Logging
    let default_filter = if config.is_production() { "info" } else { "debug" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 3. Initialize Database
    let db = Database::new(&config.database_url).await?;
    db.run_migrations().await?;

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    // 4. Routing
    let app = build_router(state);

    // 5. Start Server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        environment = %config.environment,
        default_currency = %config.default_currency,
        "Listening on {}",
        addr
    );
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    let api = Router::<Arc<AppState>>::new()
        .nest("/transactions", transactions::handler::transactions_router(state.clone()))
        .nest("/reports", reports::handler::reports_router(state.clone()));

    Router::<Arc<AppState>>::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    if !config.is_production() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::warn!("ALLOWED_ORIGINS is empty in production: cross-origin requests will be rejected");
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
