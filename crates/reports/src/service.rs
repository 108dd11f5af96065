use crate::builder::build_report;
use crate::models::MonthlyReport;
use crate::period::{compute_month_range, MIN_YEAR};
use chrono::{DateTime, Datelike, Utc};
use database::Database;
use std::future::Future;
use tracing::instrument;
use transactions::models::Transaction;
use transactions::service::{TransactionError, TransactionService};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid year {year}: must be between {min} and {max}", min = MIN_YEAR)]
    InvalidYear { year: i32, max: i32 },
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(i32),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Transaction store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<TransactionError> for ReportError {
    fn from(err: TransactionError) -> Self {
        ReportError::StoreUnavailable(err.to_string())
    }
}

/// Read access to transactions by date, the only store call a report makes.
pub trait TransactionSource {
    /// Every transaction dated within `[start, end]`, both ends included.
    fn transactions_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Transaction>, ReportError>> + Send;
}

impl TransactionSource for Database {
    async fn transactions_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, ReportError> {
        Ok(TransactionService::list_by_date_range(self, start, end).await?)
    }
}

pub struct ReportService;

impl ReportService {
    /// Validates the period, loads its transactions with a single store call
    /// and aggregates them. Nothing is read when validation fails.
    #[instrument(skip(source))]
    pub async fn get_monthly_report<S: TransactionSource + Sync>(
        source: &S,
        year: i32,
        month: i32,
    ) -> Result<MonthlyReport, ReportError> {
        let range = compute_month_range(year, month)?;

        let transactions = source
            .transactions_between(range.start, range.end)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load transactions for report: {}", e);
                e
            })?;

        let report = build_report(year, month as u32, transactions);
        tracing::info!(
            transaction_count = report.summary.transaction_count,
            "Monthly report built"
        );

        Ok(report)
    }

    /// Report for the month the host clock (UTC) is in right now.
    #[instrument(skip(source))]
    pub async fn get_current_month_report<S: TransactionSource + Sync>(
        source: &S,
    ) -> Result<MonthlyReport, ReportError> {
        let now = Utc::now();
        Self::get_monthly_report(source, now.year(), now.month() as i32).await
    }
}
