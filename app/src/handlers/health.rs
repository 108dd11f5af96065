use axum::Json;
use serde_json::{json, Value};

pub const SERVICE_NAME: &str = "personal-finance-api";

pub async fn health_check() -> Json<Value> {
    tracing::debug!("Health check");
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
