//! Income linking and reconciliation.
//!
//! Expenses can be marked as funded by one or more incomes. For a given
//! reporting window this module answers: how much of each referenced
//! income is already consumed, and what remains. The report is
//! recomputed from scratch on every call — there is no cache to
//! invalidate and the input sizes (hundreds to low thousands of
//! records) make that a non-issue.

use std::collections::HashMap;

use crate::models::{Transaction, TransactionId};

/// One income and the expenses currently drawing on it.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedIncome {
    /// The income record itself (amount unscaled).
    pub income: Transaction,
    /// Human identifier for display: the income's category label.
    pub label: String,
    /// Sum of amounts of the window's expenses linked to this income.
    /// Pending expenses count here even though they are excluded from
    /// settled-expense totals: a linked expense is a claim on the
    /// income whether or not it has been paid yet.
    pub expenses_linked: f64,
    /// `income.amount - expenses_linked`. Negative when over-allocated;
    /// never clamped — the overage is a signal the UI surfaces.
    pub remaining_balance: f64,
    /// The linked expenses, in window order.
    pub linked_expenses: Vec<Transaction>,
}

impl LinkedIncome {
    /// Share of the income consumed, as a display percentage clamped
    /// to `[0, 100]`. Zero when the income amount is not positive.
    ///
    /// Only the ratio is clamped; the underlying balance figures are
    /// not.
    #[must_use]
    pub fn usage_percent(&self) -> f64 {
        if self.income.amount > 0.0 {
            (self.expenses_linked / self.income.amount * 100.0).min(100.0)
        } else {
            0.0
        }
    }
}

/// Reconciliation report for one reporting window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkedIncomesReport {
    /// Referenced incomes in first-reference order. Incomes with no
    /// linked expense in the window do not appear.
    pub incomes: Vec<LinkedIncome>,
    /// Sum of remaining balances, negatives included.
    pub total_remaining_balance: f64,
}

impl LinkedIncomesReport {
    /// Sum of the amounts of all incomes in the report.
    #[must_use]
    pub fn total_income(&self) -> f64 {
        self.incomes.iter().map(|entry| entry.income.amount).sum()
    }

    /// Sum of linked-expense totals across the report.
    #[must_use]
    pub fn total_expenses_linked(&self) -> f64 {
        self.incomes.iter().map(|entry| entry.expenses_linked).sum()
    }

    /// Overall consumption percentage across all referenced incomes,
    /// clamped to `[0, 100]` for display.
    #[must_use]
    pub fn overall_usage_percent(&self) -> f64 {
        let total = self.total_income();
        if total > 0.0 {
            (self.total_expenses_linked() / total * 100.0).min(100.0)
        } else {
            0.0
        }
    }
}

/// Builds the reconciliation report.
///
/// `window_transactions` is the window-filtered slice whose expenses
/// are scanned; `all_transactions` is the full ledger used to resolve
/// referenced incomes, which may be dated outside the window. Ids that
/// resolve to no record are dropped from the report silently — a
/// dangling reference is a documented skip, not an error.
///
/// Each entry of an expense's `linked_income_ids` contributes once; a
/// duplicated id inside one expense therefore double-counts. The write
/// boundary deduplicates link sets, so this only matters for data
/// written by older clients.
#[must_use]
pub fn linked_incomes_report(
    all_transactions: &[Transaction],
    window_transactions: &[Transaction],
) -> LinkedIncomesReport {
    let mut order: Vec<TransactionId> = Vec::new();
    let mut linked_sums: HashMap<TransactionId, f64> = HashMap::new();
    let mut linked_details: HashMap<TransactionId, Vec<Transaction>> = HashMap::new();

    for expense in window_transactions.iter().filter(|tx| tx.has_linked_incomes()) {
        for income_id in &expense.linked_income_ids {
            if !linked_sums.contains_key(income_id) {
                order.push(income_id.clone());
            }
            *linked_sums.entry(income_id.clone()).or_insert(0.0) += expense.amount;
            linked_details
                .entry(income_id.clone())
                .or_default()
                .push(expense.clone());
        }
    }

    let mut report = LinkedIncomesReport::default();
    for income_id in order {
        let Some(income) = all_transactions.iter().find(|tx| tx.id == income_id) else {
            tracing::debug!(income_id = %income_id, "dropping dangling income reference");
            continue;
        };
        let expenses_linked = linked_sums.get(&income_id).copied().unwrap_or_default();
        let linked_expenses = linked_details.remove(&income_id).unwrap_or_default();
        let remaining_balance = income.amount - expenses_linked;
        report.total_remaining_balance += remaining_balance;
        report.incomes.push(LinkedIncome {
            income: income.clone(),
            label: income.category.clone(),
            expenses_linked,
            remaining_balance,
            linked_expenses,
        });
    }
    report
}
