use crate::models::MonthlyReport;
use crate::service::{ReportError, ReportService};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::AppState;
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let status = match self {
            ReportError::InvalidYear { .. }
            | ReportError::InvalidMonth(_)
            | ReportError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ReportError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let msg = match &self {
            ReportError::StoreUnavailable(_) => "Failed to generate report".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub fn reports_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/monthly/{year}/{month}", get(get_monthly_report))
        .route("/current-month", get(get_current_month_report))
        .with_state(state)
}

async fn get_monthly_report(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(String, String)>,
) -> Result<Json<MonthlyReport>, ReportError> {
    let year: i32 = year
        .parse()
        .map_err(|_| ReportError::InvalidInput("Invalid year format".into()))?;
    let month: i32 = month
        .parse()
        .map_err(|_| ReportError::InvalidInput("Invalid month format".into()))?;

    tracing::info!("Fetching monthly report for {}-{:02}", year, month);

    let report = ReportService::get_monthly_report(&state.db, year, month)
        .await
        .map_err(|e| {
            tracing::error!("get_monthly_report error: {:?}", e);
            e
        })?;

    Ok(Json(report))
}

async fn get_current_month_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MonthlyReport>, ReportError> {
    let report = ReportService::get_current_month_report(&state.db)
        .await
        .map_err(|e| {
            tracing::error!("get_current_month_report error: {:?}", e);
            e
        })?;

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use clap::Parser;
    use common::Config;
    use database::get_test_db;
    use serde_json::Value;
    use transactions::models::RawCreateTransactionRequest;
    use transactions::service::TransactionService;

    async fn test_server() -> (TestServer, Arc<AppState>) {
        let state = Arc::new(AppState {
            db: get_test_db().await,
            config: Config::parse_from(["app"]),
        });
        let app = Router::new()
            .nest("/api/v1/reports", reports_router(state.clone()))
            .with_state(state.clone());

        (TestServer::try_new(app).expect("Could not create test server."), state)
    }

    async fn seed(state: &AppState, kind: &str, amount: f64, currency: &str, category: &str, date: &str) {
        let raw = RawCreateTransactionRequest {
            kind: kind.into(),
            amount,
            currency: Some(currency.into()),
            description: "seed".into(),
            category: category.into(),
            date: Some(date.into()),
        };
        TransactionService::create_transaction(&state.db, raw, "ARS")
            .await
            .expect("Could not seed transaction");
    }

    #[tokio::test]
    async fn monthly_report_uses_snake_case_contract() {
        let (server, state) = test_server().await;
        seed(&state, "income", 100000.0, "ARS", "salary", "2024-06-01").await;
        seed(&state, "expense", 25000.0, "ARS", "rent", "2024-06-02").await;
        seed(&state, "expense", 200.0, "USD", "rent", "2024-06-03").await;

        let response = server.get("/api/v1/reports/monthly/2024/6").await;
        response.assert_status_ok();
        let body: Value = response.json();

        assert_eq!(body["month"], "June");
        assert_eq!(body["year"], 2024);
        assert_eq!(body["total_income"]["ARS"], 100000.0);
        assert_eq!(body["total_expense"]["USD"], 200.0);
        assert_eq!(body["balance"]["ARS"], 75000.0);
        assert_eq!(body["balance"]["USD"], -200.0);
        assert_eq!(body["summary"]["transaction_count"], 3);
        assert_eq!(body["summary"]["income_count"], 1);
        assert_eq!(body["summary"]["expense_count"], 2);
        assert_eq!(body["summary"]["category_breakdown"]["rent"]["count"], 2);
        assert_eq!(body["summary"]["category_breakdown"]["rent"]["totals"]["USD"], 200.0);
        assert_eq!(body["transactions"][0]["type"], "income");
    }

    #[tokio::test]
    async fn empty_month_report() {
        let (server, _state) = test_server().await;

        let report: MonthlyReport = server.get("/api/v1/reports/monthly/2024/12").await.json();

        assert_eq!(report.month, "December");
        assert!(report.balance.is_empty());
        assert!(report.summary.category_breakdown.is_empty());
        assert_eq!(report.summary.transaction_count, 0);
    }

    #[tokio::test]
    async fn invalid_periods_are_bad_requests() {
        let (server, _state) = test_server().await;

        for path in [
            "/api/v1/reports/monthly/1800/6",
            "/api/v1/reports/monthly/2024/13",
            "/api/v1/reports/monthly/2024/0",
            "/api/v1/reports/monthly/abcd/6",
            "/api/v1/reports/monthly/2024/june",
        ] {
            server.get(path).await.assert_status_bad_request();
        }

        let body: Value = server.get("/api/v1/reports/monthly/2024/13").await.json();
        assert!(body["error"].as_str().unwrap().contains("month must be between 1 and 12"));
    }

    #[tokio::test]
    async fn current_month_report() {
        let (server, _state) = test_server().await;

        let response = server.get("/api/v1/reports/current-month").await;
        response.assert_status_ok();
        let report: MonthlyReport = response.json();
        assert_eq!(report.year, chrono::Datelike::year(&chrono::Utc::now()));
    }

    #[test]
    fn store_errors_map_to_server_error() {
        let response = ReportError::StoreUnavailable("disk full".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ReportError::InvalidMonth(13).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
