use crate::models::{
    CreateTransactionRequest, RawCreateTransactionRequest, RawUpdateTransactionRequest, Transaction,
    TransactionFilters, TransactionQuery,
};
use crate::repository::TransactionRepository;
use chrono::{DateTime, Utc};
use database::{Database, RepositoryError};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Transaction not found")]
    NotFound,
}

impl From<RepositoryError> for TransactionError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => TransactionError::NotFound,
            RepositoryError::CheckViolation(msg) => TransactionError::InvalidInput(msg),
            RepositoryError::Infrastructure(e) => TransactionError::Infrastructure(e.to_string()),
            _ => TransactionError::Infrastructure(err.to_string()),
        }
    }
}

fn check_id(id: i64) -> Result<(), TransactionError> {
    if id <= 0 {
        return Err(TransactionError::InvalidInput("Invalid transaction ID".into()));
    }
    Ok(())
}

pub struct TransactionService;

impl TransactionService {
    #[instrument(skip(db, raw), fields(kind = %raw.kind, category = %raw.category))]
    pub async fn create_transaction(
        db: &Database,
        raw: RawCreateTransactionRequest,
        default_currency: &str,
    ) -> Result<Transaction, TransactionError> {
        let now = Utc::now();
        let req = CreateTransactionRequest::new(raw, default_currency, now)
            .map_err(TransactionError::InvalidInput)?;

        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        let id = repo.create(&req, now).await?;
        let transaction = repo.find_by_id(id).await?.ok_or(TransactionError::NotFound)?;

        uow.commit().await?;

        tracing::info!(transaction_id = id, "Transaction created");
        Ok(transaction)
    }

    #[instrument(skip(db, raw))]
    pub async fn update_transaction(
        db: &Database,
        id: i64,
        raw: RawUpdateTransactionRequest,
        default_currency: &str,
    ) -> Result<Transaction, TransactionError> {
        check_id(id)?;

        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        let existing = repo.find_by_id(id).await?.ok_or(TransactionError::NotFound)?;
        let req = CreateTransactionRequest::new(raw.merge_onto(&existing), default_currency, existing.occurred_at)
            .map_err(TransactionError::InvalidInput)?;

        repo.update(id, &req, Utc::now()).await?;
        let transaction = repo.find_by_id(id).await?.ok_or(TransactionError::NotFound)?;

        uow.commit().await?;

        Ok(transaction)
    }

    #[instrument(skip(db))]
    pub async fn get_transaction(db: &Database, id: i64) -> Result<Transaction, TransactionError> {
        check_id(id)?;

        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        let transaction = repo.find_by_id(id).await?.ok_or(TransactionError::NotFound)?;

        Ok(transaction)
    }

    #[instrument(skip(db))]
    pub async fn list_transactions(
        db: &Database,
        filters: TransactionFilters,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let query = TransactionQuery::try_from(filters).map_err(TransactionError::InvalidInput)?;

        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        let transactions = repo.list(&query).await?;
        tracing::debug!(count = transactions.len(), "Transactions listed");

        Ok(transactions)
    }

    /// Every transaction whose date falls in `[start, end]`, oldest first.
    /// Runs inside one database transaction so the result is a consistent snapshot.
    #[instrument(skip(db))]
    pub async fn list_by_date_range(
        db: &Database,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        let transactions = repo.list_between(start, end).await?;
        tracing::debug!(count = transactions.len(), "Transactions in range");

        Ok(transactions)
    }

    #[instrument(skip(db))]
    pub async fn delete_transaction(db: &Database, id: i64) -> Result<(), TransactionError> {
        check_id(id)?;

        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        repo.delete(id).await?;

        uow.commit().await?;
        tracing::info!(transaction_id = id, "Transaction deleted");
        Ok(())
    }
}
