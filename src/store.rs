//! Pluggable record stores for the user's transaction and category
//! tables.
//!
//! The backend owns the data; a [`RecordStore`] is the crate's async
//! boundary to it. The production implementation is
//! [`crate::client::ApiClient`]; [`InMemoryStore`] backs tests.

mod memory;

pub use memory::InMemoryStore;

use crate::error::Result;
use crate::models::{
    Category, CategoryId, NewCategory, NewTransaction, Transaction, TransactionId,
    TransactionPatch, UserId,
};

/// Async access to one user's records.
///
/// All methods take `&self` — implementations use interior mutability
/// (e.g. `Mutex`) for thread-safe mutation. Every operation is scoped by
/// `user`: a store never answers for rows it was not asked about.
pub trait RecordStore: core::fmt::Debug + Send + Sync {
    /// Returns all of the user's transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    fn fetch_transactions(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Vec<Transaction>>> + Send;

    /// Creates a transaction and returns the stored row. The backend
    /// assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails; nothing is stored in
    /// that case.
    fn insert_transaction(
        &self,
        user: &UserId,
        new: NewTransaction,
    ) -> impl Future<Output = Result<Transaction>> + Send;

    /// Applies a partial update to a transaction and returns the
    /// updated row.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails or the row does not
    /// exist.
    fn update_transaction(
        &self,
        user: &UserId,
        id: &TransactionId,
        patch: TransactionPatch,
    ) -> impl Future<Output = Result<Transaction>> + Send;

    /// Deletes a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    fn delete_transaction(
        &self,
        user: &UserId,
        id: &TransactionId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Returns the user's custom categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    fn fetch_categories(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<Vec<Category>>> + Send;

    /// Creates a custom category and returns the stored row. The
    /// backend assigns the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails; nothing is stored in
    /// that case.
    fn insert_category(
        &self,
        user: &UserId,
        new: NewCategory,
    ) -> impl Future<Output = Result<Category>> + Send;

    /// Deletes a custom category by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    fn delete_category(
        &self,
        user: &UserId,
        id: &CategoryId,
    ) -> impl Future<Output = Result<()>> + Send;
}
