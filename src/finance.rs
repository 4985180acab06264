//! The per-session finance service.
//!
//! [`Finance`] owns the in-memory ledger and category registry for one
//! signed-in user and drives every mutation through the same sequence:
//! validate, write to the backend, and only on success apply the
//! confirmed row locally. A failed remote write leaves the in-memory
//! state untouched; there are no retries and no partial applies.

use std::sync::Mutex;

use chrono::{Datelike, NaiveDate};

use crate::categories::{CategoryRegistry, default_custom_icon};
use crate::error::{PlataError, Result};
use crate::ledger::{self, CategoryTotal, MonthlyFlow, Summary, Window};
use crate::linking::{self, LinkedIncomesReport};
use crate::models::{
    Category, CategoryId, NewCategory, NewTransaction, Session, Transaction, TransactionId,
    TransactionKind, TransactionPatch, UserId,
};
use crate::store::RecordStore;
use crate::validation::{ValidationError, validate_new_transaction, validate_patch};

/// The session state guarded by the service mutex.
#[derive(Debug)]
struct SessionState {
    /// The signed-in session.
    session: Session,
    /// The user's full ledger, date-descending.
    ledger: Vec<Transaction>,
    /// Built-in plus custom categories.
    registry: CategoryRegistry,
}

/// Options narrowing which rows a month-to-month copy takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyFilter {
    /// Keep only rows of this kind, when set.
    pub kind: Option<TransactionKind>,
    /// Keep only pending rows.
    pub pending_only: bool,
}

impl CopyFilter {
    /// No filtering: every row in the source window is copied.
    #[inline]
    #[must_use]
    pub const fn all() -> Self {
        Self {
            kind: None,
            pending_only: false,
        }
    }

    /// Keeps only rows of the given kind.
    #[inline]
    #[must_use]
    pub const fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Keeps only pending rows.
    #[inline]
    #[must_use]
    pub const fn pending_only(mut self) -> Self {
        self.pending_only = true;
        self
    }

    /// Returns `true` if the row passes the filter.
    fn keeps(self, tx: &Transaction) -> bool {
        self.kind.is_none_or(|kind| tx.kind == kind) && (!self.pending_only || tx.is_pending)
    }
}

/// Finance service for one signed-in user.
///
/// Constructed once per session over a [`RecordStore`]; all state lives
/// behind a single mutex, which is never held across an await. Every
/// operation other than [`Finance::begin_session`] fails fast with
/// [`PlataError::NoSession`] until a session begins.
#[derive(Debug)]
pub struct Finance<S> {
    /// Backend boundary.
    store: S,
    /// Session state; `None` until `begin_session`.
    state: Mutex<Option<SessionState>>,
}

impl<S: RecordStore> Finance<S> {
    /// Creates a service with no active session.
    #[inline]
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: Mutex::new(None),
        }
    }

    // ── Session lifecycle ───────────────────────────────────────────

    /// Starts a session: loads the user's full ledger and custom
    /// categories from the backend, sorted date-descending.
    ///
    /// # Errors
    ///
    /// Returns an error if either fetch fails; no session is installed
    /// in that case.
    #[tracing::instrument(skip_all)]
    pub async fn begin_session(&self, session: Session) -> Result<()> {
        let mut ledger = self.store.fetch_transactions(&session.user).await?;
        let customs = self.store.fetch_categories(&session.user).await?;
        sort_date_descending(&mut ledger);
        tracing::debug!(
            user = %session.user,
            transactions = ledger.len(),
            custom_categories = customs.len(),
            "session started"
        );
        self.set_state(Some(SessionState {
            session,
            ledger,
            registry: CategoryRegistry::with_customs(customs),
        }))
    }

    /// Ends the session, dropping all local state. Token revocation is
    /// the client's concern.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::State`] if the lock is poisoned.
    pub fn end_session(&self) -> Result<()> {
        self.set_state(None)
    }

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if no session is active.
    pub fn current_user(&self) -> Result<UserId> {
        self.with_state(|state| Ok(state.session.user.clone()))
    }

    /// Re-fetches the ledger and custom categories from the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if either fetch fails; local state is kept in
    /// that case.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self) -> Result<()> {
        let user = self.current_user()?;
        let mut ledger = self.store.fetch_transactions(&user).await?;
        let customs = self.store.fetch_categories(&user).await?;
        sort_date_descending(&mut ledger);
        self.with_state(|state| {
            state.ledger = ledger;
            state.registry = CategoryRegistry::with_customs(customs);
            Ok(())
        })
    }

    // ── Ledger reads ────────────────────────────────────────────────

    /// The full ledger, date-descending.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if no session is active.
    pub fn transactions(&self) -> Result<Vec<Transaction>> {
        self.with_state(|state| Ok(state.ledger.clone()))
    }

    /// The transactions inside a window, in ledger order.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if no session is active.
    pub fn transactions_in(&self, window: Window) -> Result<Vec<Transaction>> {
        self.with_state(|state| Ok(ledger::filter_by_window(&state.ledger, window)))
    }

    /// Summary for a single month (`month` is zero-based).
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if no session is active.
    pub fn month_summary(&self, month: u32, year: i32) -> Result<Summary> {
        self.with_state(|state| Ok(ledger::month_summary(&state.ledger, month, year)))
    }

    /// Summary for a whole year.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if no session is active.
    pub fn year_summary(&self, year: i32) -> Result<Summary> {
        self.with_state(|state| Ok(ledger::year_summary(&state.ledger, year)))
    }

    /// Twelve-month cash-flow series for a year.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if no session is active.
    pub fn monthly_cash_flow(&self, year: i32) -> Result<Vec<MonthlyFlow>> {
        self.with_state(|state| Ok(ledger::monthly_cash_flow(&state.ledger, year)))
    }

    /// Expense totals per category label in the window.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if no session is active.
    pub fn expenses_by_category(&self, window: Window) -> Result<Vec<CategoryTotal>> {
        self.with_state(|state| Ok(ledger::expenses_by_category(&state.ledger, window)))
    }

    /// All pending transactions, any window.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if no session is active.
    pub fn pending_transactions(&self) -> Result<Vec<Transaction>> {
        self.with_state(|state| Ok(ledger::pending_transactions(&state.ledger)))
    }

    /// Reconciliation report for the window. Referenced incomes are
    /// resolved against the full ledger, so an income dated outside the
    /// window still appears.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if no session is active.
    pub fn linked_incomes_report(&self, window: Window) -> Result<LinkedIncomesReport> {
        self.with_state(|state| {
            let windowed = ledger::filter_by_window(&state.ledger, window);
            Ok(linking::linked_incomes_report(&state.ledger, &windowed))
        })
    }

    // ── Ledger writes ───────────────────────────────────────────────

    /// Creates a transaction: validates, writes to the backend, then
    /// inserts the confirmed row into the local ledger.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any remote call, or the
    /// backend error; local state is unchanged on failure.
    #[tracing::instrument(skip_all)]
    pub async fn add_transaction(&self, mut new: NewTransaction) -> Result<Transaction> {
        validate_new_transaction(&new)?;
        new.linked_income_ids = dedup_preserving_order(new.linked_income_ids);
        let user = self.current_user()?;
        let created = self.store.insert_transaction(&user, new).await?;
        tracing::debug!(id = %created.id, "transaction created");
        self.with_state(|state| {
            state.ledger.push(created.clone());
            sort_date_descending(&mut state.ledger);
            Ok(created)
        })
    }

    /// Applies a partial update: validates the set fields, writes to
    /// the backend, then replaces the local row with the confirmed one.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any remote call, or the
    /// backend error; local state is unchanged on failure.
    #[tracing::instrument(skip_all)]
    pub async fn update_transaction(
        &self,
        id: &TransactionId,
        mut patch: TransactionPatch,
    ) -> Result<Transaction> {
        validate_patch(&patch)?;
        if let Some(ids) = patch.linked_income_ids.take() {
            patch = patch.linked_income_ids(dedup_preserving_order(ids));
        }
        let user = self.current_user()?;
        let updated = self.store.update_transaction(&user, id, patch).await?;
        self.replace_row(updated.clone())?;
        Ok(updated)
    }

    /// Deletes a transaction remotely, then locally.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged on failure.
    #[tracing::instrument(skip_all)]
    pub async fn delete_transaction(&self, id: &TransactionId) -> Result<()> {
        let user = self.current_user()?;
        self.store.delete_transaction(&user, id).await?;
        self.with_state(|state| {
            state.ledger.retain(|tx| &tx.id != id);
            Ok(())
        })
    }

    /// Flips a transaction's pending flag. An unknown id is a silent
    /// no-op: the row is already gone and there is nothing to settle.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged on failure.
    #[tracing::instrument(skip_all)]
    pub async fn toggle_pending(&self, id: &TransactionId) -> Result<()> {
        let current = self.with_state(|state| {
            Ok(state
                .ledger
                .iter()
                .find(|tx| &tx.id == id)
                .map(|tx| tx.is_pending))
        })?;
        let Some(is_pending) = current else {
            tracing::debug!(id = %id, "toggle on unknown transaction ignored");
            return Ok(());
        };
        let user = self.current_user()?;
        let updated = self
            .store
            .update_transaction(&user, id, TransactionPatch::new().is_pending(!is_pending))
            .await?;
        self.replace_row(updated)
    }

    /// Replaces an expense's income links with the given set, deduped
    /// in first-occurrence order.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged on failure.
    #[tracing::instrument(skip_all)]
    pub async fn link_expense_to_income(
        &self,
        expense_id: &TransactionId,
        income_ids: Vec<TransactionId>,
    ) -> Result<Transaction> {
        let links = dedup_preserving_order(income_ids);
        let user = self.current_user()?;
        let updated = self
            .store
            .update_transaction(&user, expense_id, TransactionPatch::new().linked_income_ids(links))
            .await?;
        self.replace_row(updated.clone())?;
        Ok(updated)
    }

    /// Copies the source window's rows into a target month, one create
    /// per row through the normal add path.
    ///
    /// Each copy keeps its kind, amount, description, category, and
    /// pending flag; the day of month is kept too, clamping to the
    /// target month's last day when it would not exist (Jan 31 to
    /// February lands on the 28th, or the 29th in a leap year). Income
    /// links are not carried over. Copies created before a failure
    /// stay, matching the one-create-per-row write model.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTargetMonth`] for a month
    /// outside `0..=11` before any write, or the first failing create.
    #[tracing::instrument(skip_all)]
    pub async fn copy_transactions(
        &self,
        source: Window,
        target_month: u32,
        target_year: i32,
        filter: CopyFilter,
    ) -> Result<Vec<Transaction>> {
        if target_month > 11 {
            return Err(ValidationError::InvalidTargetMonth.into());
        }
        let sources = self.with_state(|state| {
            Ok(ledger::filter_by_window(&state.ledger, source)
                .into_iter()
                .filter(|tx| filter.keeps(tx))
                .collect::<Vec<_>>())
        })?;
        let mut copies = Vec::with_capacity(sources.len());
        for tx in sources {
            let date = redate_into_month(tx.date, target_month, target_year)
                .ok_or(PlataError::Validation(ValidationError::InvalidTargetMonth))?;
            let copy = self
                .add_transaction(NewTransaction {
                    kind: tx.kind,
                    amount: tx.amount,
                    description: tx.description,
                    category: tx.category,
                    date,
                    is_pending: tx.is_pending,
                    linked_income_ids: Vec::new(),
                })
                .await?;
            copies.push(copy);
        }
        tracing::debug!(count = copies.len(), "transactions copied");
        Ok(copies)
    }

    // ── Categories ──────────────────────────────────────────────────

    /// All categories, built-ins first.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::NoSession`] if no session is active.
    pub fn categories(&self) -> Result<Vec<Category>> {
        self.with_state(|state| Ok(state.registry.all()))
    }

    /// Creates a custom category with the default icon for its kind.
    ///
    /// # Errors
    ///
    /// Returns a validation error (length rules, or a case-insensitive
    /// name collision with any existing category) before any remote
    /// call, or the backend error; the registry is unchanged on
    /// failure.
    #[tracing::instrument(skip_all)]
    pub async fn add_category(&self, name: &str, kind: TransactionKind) -> Result<Category> {
        self.with_state(|state| Ok(state.registry.check_new_name(name)?))?;
        let user = self.current_user()?;
        let created = self
            .store
            .insert_category(
                &user,
                NewCategory {
                    name: name.trim().to_owned(),
                    icon: default_custom_icon(kind).to_owned(),
                    kind,
                },
            )
            .await?;
        self.with_state(|state| {
            state.registry.insert_custom(created.clone());
            Ok(created)
        })
    }

    /// Deletes a custom category. Transactions carrying its name keep
    /// the label.
    ///
    /// # Errors
    ///
    /// Returns [`crate::validation::ValidationError::BuiltinCategoryImmutable`]
    /// for a built-in id before any remote call, or the backend error;
    /// the registry is unchanged on failure.
    #[tracing::instrument(skip_all)]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<()> {
        self.with_state(|state| {
            if state.registry.is_builtin(id) {
                return Err(ValidationError::BuiltinCategoryImmutable.into());
            }
            Ok(())
        })?;
        let user = self.current_user()?;
        self.store.delete_category(&user, id).await?;
        self.with_state(|state| Ok(state.registry.remove_custom(id)?))
    }

    // ── Plumbing ────────────────────────────────────────────────────

    /// Runs a closure over the active session state.
    fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> Result<R>) -> Result<R> {
        let mut guard = self
            .state
            .lock()
            .map_err(|err| PlataError::State(err.to_string()))?;
        let state = guard.as_mut().ok_or(PlataError::NoSession)?;
        f(state)
    }

    /// Installs or clears the session state.
    fn set_state(&self, state: Option<SessionState>) -> Result<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|err| PlataError::State(err.to_string()))?;
        *guard = state;
        Ok(())
    }

    /// Replaces the local row matching the confirmed row's id, keeping
    /// the ledger date-descending.
    fn replace_row(&self, row: Transaction) -> Result<()> {
        self.with_state(|state| {
            match state.ledger.iter_mut().find(|tx| tx.id == row.id) {
                Some(existing) => *existing = row,
                None => {
                    tracing::warn!(id = %row.id, "confirmed row missing locally, inserting");
                    state.ledger.push(row);
                }
            }
            sort_date_descending(&mut state.ledger);
            Ok(())
        })
    }
}

/// Moves a date into the given month (zero-based), keeping the day but
/// clamping it to the month's last day. `None` only for an invalid
/// month.
fn redate_into_month(date: NaiveDate, month: u32, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month + 1, date.day()).or_else(|| {
        let (next_year, next_month) = if month == 11 {
            (year + 1, 0)
        } else {
            (year, month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month + 1, 1)?.pred_opt()
    })
}

/// Sorts a ledger newest-first. The sort is stable, so same-day rows
/// keep their backend order.
fn sort_date_descending(ledger: &mut [Transaction]) {
    ledger.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Drops repeated ids, keeping the first occurrence of each.
fn dedup_preserving_order(ids: Vec<TransactionId>) -> Vec<TransactionId> {
    let mut out: Vec<TransactionId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
