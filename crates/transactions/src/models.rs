use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Storage format for every timestamp column. Fixed width, so string
/// comparison in SQL is chronological comparison.
pub const DB_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn to_db_timestamp(value: &DateTime<Utc>) -> String {
    value.format(DB_TIMESTAMP_FORMAT).to_string()
}

pub fn parse_db_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, DB_TIMESTAMP_FORMAT).map(|n| n.and_utc())
}

const INVALID_DATE: &str = "Invalid date format, use YYYY-MM-DD";

/// Parses a zero-padded `YYYY-MM-DD` day into its first instant (UTC).
/// Only four-digit years are accepted, keeping stored timestamps fixed width.
pub fn parse_day(value: &str) -> Result<DateTime<Utc>, String> {
    let well_formed = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(INVALID_DATE.to_string());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| INVALID_DATE.to_string())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            _ => Err("type must be 'expense' or 'income'".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    pub category: String,
    #[serde(rename = "date")]
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("is required".into());
        return Err(err);
    }
    Ok(())
}

/// Upper-cases a currency code and checks it is three ASCII letters.
pub fn normalize_currency(value: &str) -> Result<String, String> {
    let code = value.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err("currency must be a valid 3-letter ISO code (e.g., USD, ARS, EUR)".to_string());
    }
    Ok(code)
}

// Raw input struct for deserialization (CreateTransactionRequest keeps its fields private)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RawCreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[validate(range(exclusive_min = 0.0, message = "amount must be positive"))]
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[validate(custom(function = "not_blank"))]
    pub category: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUpdateTransactionRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl RawUpdateTransactionRequest {
    /// Overlays the supplied fields on an existing transaction, producing a
    /// full request that goes through the same checks as a create.
    pub fn merge_onto(self, existing: &Transaction) -> RawCreateTransactionRequest {
        RawCreateTransactionRequest {
            kind: self.kind.unwrap_or_else(|| existing.kind.to_string()),
            amount: self.amount.unwrap_or(existing.amount),
            currency: Some(self.currency.unwrap_or_else(|| existing.currency.clone())),
            description: self.description.unwrap_or_else(|| existing.description.clone()),
            category: self.category.unwrap_or_else(|| existing.category.clone()),
            date: self.date,
        }
    }
}

/// A transaction ready to be written. Once created via `new()`, it is valid.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTransactionRequest {
    kind: TransactionKind,
    amount: f64,
    currency: String,
    description: String,
    category: String,
    occurred_at: DateTime<Utc>,
}

impl CreateTransactionRequest {
    /// `default_currency` fills a missing currency, `fallback_date` a missing date.
    pub fn new(
        raw: RawCreateTransactionRequest,
        default_currency: &str,
        fallback_date: DateTime<Utc>,
    ) -> Result<Self, String> {
        let kind = raw.kind.parse::<TransactionKind>()?;
        raw.validate().map_err(|e| e.to_string())?;

        let currency = match raw.currency.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => normalize_currency(code)?,
            _ => normalize_currency(default_currency)?,
        };

        let occurred_at = match raw.date.as_deref() {
            Some(day) if !day.trim().is_empty() => parse_day(day.trim())?,
            _ => fallback_date,
        };

        Ok(Self {
            kind,
            amount: raw.amount,
            currency,
            description: raw.description.trim().to_string(),
            category: raw.category.trim().to_string(),
            occurred_at,
        })
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Query-string filters for listing transactions. Empty values mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilters {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub currency: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

/// Parsed form of `TransactionFilters`, bounds inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub currency: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<TransactionFilters> for TransactionQuery {
    type Error = String;

    fn try_from(filters: TransactionFilters) -> Result<Self, Self::Error> {
        let kind = non_empty(filters.kind)
            .map(|k| k.parse::<TransactionKind>())
            .transpose()?;
        let from = non_empty(filters.from_date)
            .map(|d| parse_day(&d))
            .transpose()?;
        // to_date covers the whole day
        let to = non_empty(filters.to_date)
            .map(|d| {
                parse_day(&d).and_then(|start| {
                    start
                        .checked_add_signed(TimeDelta::days(1) - TimeDelta::seconds(1))
                        .ok_or_else(|| INVALID_DATE.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            kind,
            category: non_empty(filters.category),
            currency: non_empty(filters.currency).map(|c| c.to_ascii_uppercase()),
            from,
            to,
        })
    }
}
