//! Ledger queries: windowed filtering and financial summaries.
//!
//! Everything here is a pure function over an in-memory slice of
//! transactions — no I/O, no caching, no failure modes. Empty input or
//! an empty window simply yields empty/zero results.

use chrono::{Datelike, NaiveDate};

use crate::models::{Transaction, TransactionKind};

/// A reporting window over the ledger.
///
/// Either bound may be omitted to mean "match any". Months are
/// zero-based (0 = January, 11 = December), matching the selector the
/// UI drives this with. Matching compares plain numeric year/month
/// components of the calendar date; no timezone is ever involved, so an
/// entry dated `2025-01-31` is a January entry everywhere on Earth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    /// Zero-based month bound, if any.
    pub month: Option<u32>,
    /// Year bound, if any.
    pub year: Option<i32>,
}

impl Window {
    /// A window matching every transaction.
    #[inline]
    #[must_use]
    pub const fn all() -> Self {
        Self {
            month: None,
            year: None,
        }
    }

    /// A single-month window (`month` is zero-based).
    #[inline]
    #[must_use]
    pub const fn month_of(month: u32, year: i32) -> Self {
        Self {
            month: Some(month),
            year: Some(year),
        }
    }

    /// A whole-year window.
    #[inline]
    #[must_use]
    pub const fn year_of(year: i32) -> Self {
        Self {
            month: None,
            year: Some(year),
        }
    }

    /// Returns `true` if the date falls inside the window.
    #[inline]
    #[must_use]
    pub fn matches(&self, date: NaiveDate) -> bool {
        self.year.is_none_or(|year| date.year() == year)
            && self.month.is_none_or(|month| date.month0() == month)
    }
}

/// Returns the transactions whose date falls inside the window,
/// preserving the relative order of the input.
#[must_use]
pub fn filter_by_window(transactions: &[Transaction], window: Window) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| window.matches(tx.date))
        .cloned()
        .collect()
}

/// Aggregated figures for one reporting window.
///
/// Totals are kind-partitioned: incomes and expenses are summed
/// independently and only [`Self::net_balance`] mixes them, as a signed
/// derivation. Pending expenses are excluded from `total_expenses`
/// until settled but always counted in `pending_total`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// Sum of income amounts in the window.
    pub total_income: f64,
    /// Sum of settled (non-pending) expense amounts in the window.
    pub total_expenses: f64,
    /// `total_income - total_expenses`.
    pub net_balance: f64,
    /// Sum of amounts flagged pending in the window, either kind.
    pub pending_total: f64,
}

/// Computes the summary for the given window.
#[must_use]
pub fn summarize(transactions: &[Transaction], window: Window) -> Summary {
    let mut summary = Summary::default();
    for tx in transactions.iter().filter(|tx| window.matches(tx.date)) {
        match tx.kind {
            TransactionKind::Income => summary.total_income += tx.amount,
            TransactionKind::Expense => {
                if !tx.is_pending {
                    summary.total_expenses += tx.amount;
                }
            }
        }
        if tx.is_pending {
            summary.pending_total += tx.amount;
        }
    }
    summary.net_balance = summary.total_income - summary.total_expenses;
    summary
}

/// Summary for a single month (`month` is zero-based).
#[inline]
#[must_use]
pub fn month_summary(transactions: &[Transaction], month: u32, year: i32) -> Summary {
    summarize(transactions, Window::month_of(month, year))
}

/// Summary for a whole year.
#[inline]
#[must_use]
pub fn year_summary(transactions: &[Transaction], year: i32) -> Summary {
    summarize(transactions, Window::year_of(year))
}

/// One month of the cash-flow series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyFlow {
    /// Zero-based month.
    pub month: u32,
    /// Income total for the month.
    pub income: f64,
    /// Settled expense total for the month.
    pub expenses: f64,
    /// `income - expenses`.
    pub balance: f64,
}

/// Computes the twelve-month cash-flow series for a year.
///
/// Always returns exactly twelve entries, months 0 through 11, using
/// the same settled-expenses rule as [`summarize`].
#[must_use]
pub fn monthly_cash_flow(transactions: &[Transaction], year: i32) -> Vec<MonthlyFlow> {
    (0..12)
        .map(|month| {
            let summary = month_summary(transactions, month, year);
            MonthlyFlow {
                month,
                income: summary.total_income,
                expenses: summary.total_expenses,
                balance: summary.net_balance,
            }
        })
        .collect()
}

/// An expense total for one category label.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// Category label as stored on the transactions.
    pub category: String,
    /// Sum of expense amounts carrying that label in the window.
    pub total: f64,
}

/// Breaks down expenses in the window by category label.
///
/// Pending expenses are included: the breakdown reports committed
/// spend per category, not cash out the door. Results are sorted by
/// total descending; ties keep first-appearance order.
#[must_use]
pub fn expenses_by_category(transactions: &[Transaction], window: Window) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.kind.is_expense() && window.matches(tx.date))
    {
        match totals.iter_mut().find(|entry| entry.category == tx.category) {
            Some(entry) => entry.total += tx.amount,
            None => totals.push(CategoryTotal {
                category: tx.category.clone(),
                total: tx.amount,
            }),
        }
    }
    totals.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(core::cmp::Ordering::Equal));
    totals
}

/// Returns all pending transactions, any window, preserving input order.
#[must_use]
pub fn pending_transactions(transactions: &[Transaction]) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.is_pending)
        .cloned()
        .collect()
}
