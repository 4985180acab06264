//! In-memory record store for testing.
//!
//! Provides [`InMemoryStore`], a thread-safe backend substitute for
//! unit tests, with an injectable write failure for exercising the
//! no-rollback-needed path in [`crate::finance::Finance`].

use core::future::{self, Future};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{PlataError, Result};
use crate::models::{
    Category, CategoryId, NewCategory, NewTransaction, Transaction, TransactionId,
    TransactionPatch, UserId,
};

/// Thread-safe in-memory record store.
///
/// Rows are partitioned by user, ids are assigned from a local counter,
/// and [`Self::fail_next_write`] makes the next mutating call return an
/// error without storing anything.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    /// All state behind a single mutex for thread-safe interior mutability.
    inner: Mutex<Inner>,
}

/// Inner mutable state.
#[derive(Debug, Default)]
struct Inner {
    /// Per-user transaction rows.
    transactions: HashMap<UserId, Vec<Transaction>>,
    /// Per-user custom category rows.
    categories: HashMap<UserId, Vec<Category>>,
    /// Id assignment counter.
    next_id: u64,
    /// When `true`, the next write fails and clears the flag.
    fail_next_write: bool,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next mutating call fail with a backend-style error.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::State`] if the lock is poisoned.
    pub fn fail_next_write(&self) -> Result<()> {
        self.with_lock(|inner| inner.fail_next_write = true)
    }

    /// Seeds a transaction row directly, bypassing failure injection.
    ///
    /// # Errors
    ///
    /// Returns [`PlataError::State`] if the lock is poisoned.
    pub fn seed_transaction(&self, user: &UserId, tx: Transaction) -> Result<()> {
        self.with_lock(|inner| inner.transactions.entry(user.clone()).or_default().push(tx))
    }

    /// Acquires the inner lock and applies a closure.
    fn with_lock<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> Result<R> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|err| PlataError::State(err.to_string()))?;
        Ok(f(&mut inner))
    }

    /// Like [`Self::with_lock`], but consumes a pending injected
    /// failure first.
    fn with_write_lock<R>(&self, f: impl FnOnce(&mut Inner) -> Result<R>) -> Result<R> {
        self.with_lock(|inner| {
            if inner.fail_next_write {
                inner.fail_next_write = false;
                return Err(PlataError::Api {
                    status: 500,
                    message: "injected write failure".to_owned(),
                });
            }
            f(inner)
        })?
    }
}

impl Inner {
    /// Assigns the next synthetic row id.
    fn assign_id(&mut self) -> String {
        self.next_id += 1;
        format!("mem-{}", self.next_id)
    }
}

impl super::RecordStore for InMemoryStore {
    #[inline]
    fn fetch_transactions(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Vec<Transaction>>> + Send {
        future::ready(
            self.with_lock(|inner| inner.transactions.get(user).cloned().unwrap_or_default()),
        )
    }

    #[inline]
    fn insert_transaction(
        &self,
        user: &UserId,
        new: NewTransaction,
    ) -> impl Future<Output = Result<Transaction>> + Send {
        future::ready(self.with_write_lock(|inner| {
            let tx = Transaction {
                id: TransactionId::from(inner.assign_id()),
                kind: new.kind,
                amount: new.amount,
                description: new.description,
                category: new.category,
                date: new.date,
                is_pending: new.is_pending,
                linked_income_ids: new.linked_income_ids,
            };
            inner
                .transactions
                .entry(user.clone())
                .or_default()
                .push(tx.clone());
            Ok(tx)
        }))
    }

    #[inline]
    fn update_transaction(
        &self,
        user: &UserId,
        id: &TransactionId,
        patch: TransactionPatch,
    ) -> impl Future<Output = Result<Transaction>> + Send {
        future::ready(self.with_write_lock(|inner| {
            let tx = inner
                .transactions
                .get_mut(user)
                .and_then(|rows| rows.iter_mut().find(|tx| &tx.id == id))
                .ok_or_else(|| PlataError::Api {
                    status: 404,
                    message: format!("transaction {id} not found"),
                })?;
            patch.apply(tx);
            Ok(tx.clone())
        }))
    }

    #[inline]
    fn delete_transaction(
        &self,
        user: &UserId,
        id: &TransactionId,
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_write_lock(|inner| {
            if let Some(rows) = inner.transactions.get_mut(user) {
                rows.retain(|tx| &tx.id != id);
            }
            Ok(())
        }))
    }

    #[inline]
    fn fetch_categories(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Vec<Category>>> + Send {
        future::ready(
            self.with_lock(|inner| inner.categories.get(user).cloned().unwrap_or_default()),
        )
    }

    #[inline]
    fn insert_category(
        &self,
        user: &UserId,
        new: NewCategory,
    ) -> impl Future<Output = Result<Category>> + Send {
        future::ready(self.with_write_lock(|inner| {
            let category = Category {
                id: CategoryId::from(inner.assign_id()),
                name: new.name,
                icon: new.icon,
                kind: new.kind,
            };
            inner
                .categories
                .entry(user.clone())
                .or_default()
                .push(category.clone());
            Ok(category)
        }))
    }

    #[inline]
    fn delete_category(
        &self,
        user: &UserId,
        id: &CategoryId,
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_write_lock(|inner| {
            if let Some(rows) = inner.categories.get_mut(user) {
                rows.retain(|c| &c.id != id);
            }
            Ok(())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use crate::store::RecordStore;
    use chrono::NaiveDate;

    fn user() -> UserId {
        UserId::from("u-1")
    }

    fn new_tx(amount: f64) -> NewTransaction {
        NewTransaction {
            kind: TransactionKind::Expense,
            amount,
            description: "groceries".to_owned(),
            category: "Casa".to_owned(),
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            is_pending: false,
            linked_income_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_persists() {
        let store = InMemoryStore::new();
        let created = store.insert_transaction(&user(), new_tx(100.0)).await.unwrap();
        assert!(created.id.as_inner().starts_with("mem-"));
        let rows = store.fetch_transactions(&user()).await.unwrap();
        assert_eq!(rows, vec![created]);
    }

    #[tokio::test]
    async fn rows_are_scoped_by_user() {
        let store = InMemoryStore::new();
        let _created = store.insert_transaction(&user(), new_tx(100.0)).await.unwrap();
        let other = store.fetch_transactions(&UserId::from("u-2")).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn update_patches_in_place() {
        let store = InMemoryStore::new();
        let created = store.insert_transaction(&user(), new_tx(100.0)).await.unwrap();
        let patch = TransactionPatch::new().amount(250.0).is_pending(true);
        let updated = store.update_transaction(&user(), &created.id, patch).await.unwrap();
        assert!((updated.amount - 250.0).abs() < f64::EPSILON);
        assert!(updated.is_pending);
        let rows = store.fetch_transactions(&user()).await.unwrap();
        assert_eq!(rows, vec![updated]);
    }

    #[tokio::test]
    async fn update_unknown_row_is_not_found() {
        let store = InMemoryStore::new();
        let result = store
            .update_transaction(&user(), &TransactionId::from("missing"), TransactionPatch::new())
            .await;
        assert!(matches!(result, Err(PlataError::Api { status: 404, .. })));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let store = InMemoryStore::new();
        let created = store.insert_transaction(&user(), new_tx(100.0)).await.unwrap();
        store.delete_transaction(&user(), &created.id).await.unwrap();
        assert!(store.fetch_transactions(&user()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn injected_failure_hits_once_and_stores_nothing() {
        let store = InMemoryStore::new();
        store.fail_next_write().unwrap();
        let result = store.insert_transaction(&user(), new_tx(100.0)).await;
        assert!(matches!(result, Err(PlataError::Api { status: 500, .. })));
        assert!(store.fetch_transactions(&user()).await.unwrap().is_empty());
        // The flag clears after one failure.
        let created = store.insert_transaction(&user(), new_tx(50.0)).await.unwrap();
        assert_eq!(store.fetch_transactions(&user()).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn category_lifecycle() {
        let store = InMemoryStore::new();
        let created = store
            .insert_category(
                &user(),
                NewCategory {
                    name: "Mascotas".to_owned(),
                    icon: "Tag".to_owned(),
                    kind: TransactionKind::Expense,
                },
            )
            .await
            .unwrap();
        assert_eq!(store.fetch_categories(&user()).await.unwrap(), vec![created.clone()]);
        store.delete_category(&user(), &created.id).await.unwrap();
        assert!(store.fetch_categories(&user()).await.unwrap().is_empty());
    }
}
