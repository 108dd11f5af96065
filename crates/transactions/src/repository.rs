use crate::models::{
    parse_db_timestamp, to_db_timestamp, CreateTransactionRequest, Transaction, TransactionQuery,
};
use chrono::{DateTime, Utc};
use database::{self, RepositoryError};
use sqlx::FromRow;

const SELECT_COLUMNS: &str =
    "SELECT id, kind, amount, currency, description, category, occurred_at, created_at, updated_at FROM transactions";

#[derive(FromRow)]
struct TransactionRecord {
    id: i64,
    kind: String,
    amount: f64,
    currency: String,
    description: String,
    category: String,
    occurred_at: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = RepositoryError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        let timestamp = |column: &str, value: &str| {
            parse_db_timestamp(value).map_err(|e| {
                RepositoryError::Corrupt(format!("transaction {} has bad {}: {}", id, column, e))
            })
        };

        Ok(Transaction {
            id,
            kind: record.kind.parse().map_err(RepositoryError::Corrupt)?,
            amount: record.amount,
            occurred_at: timestamp("occurred_at", &record.occurred_at)?,
            created_at: timestamp("created_at", &record.created_at)?,
            updated_at: timestamp("updated_at", &record.updated_at)?,
            currency: record.currency,
            description: record.description,
            category: record.category,
        })
    }
}

fn into_transactions(records: Vec<TransactionRecord>) -> Result<Vec<Transaction>, RepositoryError> {
    records.into_iter().map(Transaction::try_from).collect()
}

pub(crate) struct TransactionRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &mut self,
        req: &CreateTransactionRequest,
        now: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let now = to_db_timestamp(&now);
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO transactions (kind, amount, currency, description, category, occurred_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING id",
        )
        .bind(req.kind().as_str())
        .bind(req.amount())
        .bind(req.currency())
        .bind(req.description())
        .bind(req.category())
        .bind(to_db_timestamp(&req.occurred_at()))
        .bind(now)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn update(
        &mut self,
        id: i64,
        req: &CreateTransactionRequest,
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE transactions SET kind = $1, amount = $2, currency = $3, description = $4, category = $5, occurred_at = $6, updated_at = $7 WHERE id = $8",
        )
        .bind(req.kind().as_str())
        .bind(req.amount())
        .bind(req.currency())
        .bind(req.description())
        .bind(req.category())
        .bind(to_db_timestamp(&req.occurred_at()))
        .bind(to_db_timestamp(&now))
        .bind(id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<Transaction>, RepositoryError> {
        let record = sqlx::query_as::<_, TransactionRecord>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        record.map(Transaction::try_from).transpose()
    }

    pub async fn list(&mut self, query: &TransactionQuery) -> Result<Vec<Transaction>, RepositoryError> {
        let records = sqlx::query_as::<_, TransactionRecord>(&format!(
            "{SELECT_COLUMNS} \
             WHERE ($1 IS NULL OR kind = $1) \
               AND ($2 IS NULL OR category = $2) \
               AND ($3 IS NULL OR currency = $3) \
               AND ($4 IS NULL OR occurred_at >= $4) \
               AND ($5 IS NULL OR occurred_at <= $5) \
             ORDER BY occurred_at, id"
        ))
        .bind(query.kind.map(|k| k.as_str()))
        .bind(query.category.as_deref())
        .bind(query.currency.as_deref())
        .bind(query.from.as_ref().map(to_db_timestamp))
        .bind(query.to.as_ref().map(to_db_timestamp))
        .fetch_all(&mut *self.conn)
        .await?;

        into_transactions(records)
    }

    /// Closed interval: both `start` and `end` are included.
    pub async fn list_between(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let records = sqlx::query_as::<_, TransactionRecord>(&format!(
            "{SELECT_COLUMNS} WHERE occurred_at BETWEEN $1 AND $2 ORDER BY occurred_at, id"
        ))
        .bind(to_db_timestamp(&start))
        .bind(to_db_timestamp(&end))
        .fetch_all(&mut *self.conn)
        .await?;

        into_transactions(records)
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
