use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use transactions::models::Transaction;

/// Amounts keyed by currency code. Currencies are never converted.
pub type CurrencyTotals = HashMap<String, f64>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyReport {
    /// Month name, e.g. "June".
    pub month: String,
    pub year: i32,
    pub total_income: CurrencyTotals,
    pub total_expense: CurrencyTotals,
    /// Income minus expense per currency, over every currency seen in either total.
    pub balance: CurrencyTotals,
    pub transactions: Vec<Transaction>,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportSummary {
    pub transaction_count: usize,
    pub income_count: usize,
    pub expense_count: usize,
    pub category_breakdown: HashMap<String, CategoryTotal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    pub count: usize,
    pub totals: CurrencyTotals,
}
