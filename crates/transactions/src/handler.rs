use crate::models::{RawCreateTransactionRequest, RawUpdateTransactionRequest, Transaction, TransactionFilters};
use crate::service::{TransactionError, TransactionService};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::AppState;
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for TransactionError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            TransactionError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            TransactionError::NotFound => (StatusCode::NOT_FOUND, "Transaction not found".to_string()),
            TransactionError::Infrastructure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub fn transactions_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route(
            "/{id}",
            get(get_transaction).put(update_transaction).delete(delete_transaction),
        )
        .with_state(state)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, TransactionError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| TransactionError::InvalidInput(rejection.body_text()))
}

fn parse_id(raw: &str) -> Result<i64, TransactionError> {
    raw.parse::<i64>()
        .map_err(|_| TransactionError::InvalidInput("Invalid transaction ID".into()))
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawCreateTransactionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, TransactionError> {
    let payload = json_body(payload)?;
    let transaction =
        TransactionService::create_transaction(&state.db, payload, &state.config.default_currency)
            .await
            .map_err(|e| {
                tracing::error!("create_transaction error: {:?}", e);
                e
            })?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<TransactionFilters>,
) -> Result<Json<Vec<Transaction>>, TransactionError> {
    let transactions = TransactionService::list_transactions(&state.db, filters).await?;
    Ok(Json(transactions))
}

async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Transaction>, TransactionError> {
    let id = parse_id(&id)?;
    let transaction = TransactionService::get_transaction(&state.db, id).await?;
    Ok(Json(transaction))
}

async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<RawUpdateTransactionRequest>, JsonRejection>,
) -> Result<Json<Transaction>, TransactionError> {
    let id = parse_id(&id)?;
    let payload = json_body(payload)?;
    let transaction =
        TransactionService::update_transaction(&state.db, id, payload, &state.config.default_currency)
            .await
            .map_err(|e| {
                tracing::error!("update_transaction error: {:?}", e);
                e
            })?;

    Ok(Json(transaction))
}

async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, TransactionError> {
    let id = parse_id(&id)?;
    TransactionService::delete_transaction(&state.db, id).await?;
    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use clap::Parser;
    use common::Config;
    use database::get_test_db;

    async fn test_server() -> TestServer {
        let state = Arc::new(AppState {
            db: get_test_db().await,
            config: Config::parse_from(["app", "--default-currency", "ARS"]),
        });
        let app = Router::new()
            .nest("/api/v1/transactions", transactions_router(state.clone()))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn create_then_fetch_transaction() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/transactions")
            .json(&json!({
                "type": "expense",
                "amount": 1500,
                "description": "Coffee",
                "category": "food",
                "date": "2024-06-16"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Transaction = response.json();
        assert_eq!(created.currency, "ARS");

        let fetched: Transaction = server
            .get(&format!("/api/v1/transactions/{}", created.id))
            .await
            .json();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_with_invalid_amount_is_bad_request() {
        let server = test_server().await;

        server
            .post("/api/v1/transactions")
            .json(&json!({
                "type": "income",
                "amount": -5,
                "description": "Refund",
                "category": "misc"
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids() {
        let server = test_server().await;

        server.get("/api/v1/transactions/77").await.assert_status_not_found();
        server.get("/api/v1/transactions/abc").await.assert_status_bad_request();
        server.delete("/api/v1/transactions/77").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn list_filters_by_type() {
        let server = test_server().await;

        for (kind, category) in [("income", "salary"), ("expense", "rent"), ("expense", "food")] {
            server
                .post("/api/v1/transactions")
                .json(&json!({
                    "type": kind,
                    "amount": 10,
                    "currency": "usd",
                    "description": "x",
                    "category": category,
                    "date": "2024-06-01"
                }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let expenses: Vec<Transaction> = server
            .get("/api/v1/transactions")
            .add_query_param("type", "expense")
            .await
            .json();
        assert_eq!(expenses.len(), 2);
        assert!(expenses.iter().all(|t| t.currency == "USD"));
    }

    #[tokio::test]
    async fn create_with_missing_fields_is_bad_request() {
        let server = test_server().await;

        for body in [
            json!({ "type": "expense", "amount": 10, "category": "food" }),
            json!({ "type": "expense", "description": "Lunch", "category": "food" }),
            json!({ "amount": 10, "description": "Lunch", "category": "food" }),
        ] {
            let response = server.post("/api/v1/transactions").json(&body).await;
            response.assert_status_bad_request();
            let error: serde_json::Value = response.json();
            assert!(error["error"].is_string());
        }

        let response = server
            .post("/api/v1/transactions")
            .text("not json")
            .content_type("application/json")
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn update_with_malformed_body_is_bad_request() {
        let server = test_server().await;

        let created: Transaction = server
            .post("/api/v1/transactions")
            .json(&json!({
                "type": "income",
                "amount": 10,
                "description": "Gift",
                "category": "misc"
            }))
            .await
            .json();

        let response = server
            .put(&format!("/api/v1/transactions/{}", created.id))
            .json(&json!({ "amount": "lots" }))
            .await;
        response.assert_status_bad_request();
        let error: serde_json::Value = response.json();
        assert!(error["error"].is_string());
    }

    #[tokio::test]
    async fn update_and_delete_transaction() {
        let server = test_server().await;

        let created: Transaction = server
            .post("/api/v1/transactions")
            .json(&json!({
                "type": "expense",
                "amount": 25000,
                "description": "Rent",
                "category": "housing",
                "date": "2024-06-01"
            }))
            .await
            .json();

        let updated: Transaction = server
            .put(&format!("/api/v1/transactions/{}", created.id))
            .json(&json!({ "amount": 26000 }))
            .await
            .json();
        assert_eq!(updated.amount, 26000.0);
        assert_eq!(updated.description, "Rent");

        server
            .delete(&format!("/api/v1/transactions/{}", created.id))
            .await
            .assert_status_ok();
        server
            .get(&format!("/api/v1/transactions/{}", created.id))
            .await
            .assert_status_not_found();
    }
}
