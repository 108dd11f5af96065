//! Turns the transactions of one month into a `MonthlyReport`.
//!
//! Pure and synchronous: every call owns its accumulators, so concurrent
//! report requests share nothing.

use crate::models::{CategoryTotal, CurrencyTotals, MonthlyReport, ReportSummary};
use crate::period::month_label;
use std::collections::HashMap;
use transactions::models::{Transaction, TransactionKind};

fn add(totals: &mut CurrencyTotals, currency: &str, amount: f64) {
    *totals.entry(currency.to_string()).or_insert(0.0) += amount;
}

/// Income minus expense for every currency present in either map.
pub fn compute_balance(income: &CurrencyTotals, expense: &CurrencyTotals) -> CurrencyTotals {
    income
        .keys()
        .chain(expense.keys())
        .map(|currency| {
            let earned = income.get(currency).copied().unwrap_or(0.0);
            let spent = expense.get(currency).copied().unwrap_or(0.0);
            (currency.clone(), earned - spent)
        })
        .collect()
}

/// Aggregates `transactions` (already limited to the month) in input order.
/// The transactions are moved into the report unchanged.
///
/// `month` is expected in 1..=12, as checked by `compute_month_range`; any
/// other value is labelled with its number.
pub fn build_report(year: i32, month: u32, transactions: Vec<Transaction>) -> MonthlyReport {
    let mut total_income = CurrencyTotals::new();
    let mut total_expense = CurrencyTotals::new();
    let mut category_breakdown: HashMap<String, CategoryTotal> = HashMap::new();
    let mut income_count = 0;
    let mut expense_count = 0;

    for t in &transactions {
        match t.kind {
            TransactionKind::Income => {
                add(&mut total_income, &t.currency, t.amount);
                income_count += 1;
            }
            TransactionKind::Expense => {
                add(&mut total_expense, &t.currency, t.amount);
                expense_count += 1;
            }
        }

        let category = category_breakdown.entry(t.category.clone()).or_default();
        category.count += 1;
        add(&mut category.totals, &t.currency, t.amount);
    }

    let balance = compute_balance(&total_income, &total_expense);

    MonthlyReport {
        month: month_label(month)
            .map(str::to_string)
            .unwrap_or_else(|| month.to_string()),
        year,
        total_income,
        total_expense,
        balance,
        summary: ReportSummary {
            transaction_count: transactions.len(),
            income_count,
            expense_count,
            category_breakdown,
        },
        transactions,
    }
}
