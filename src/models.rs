//! Data models for Plata entities.
//!
//! This module contains strongly-typed representations of the ledger
//! entities stored in the backend tables, newtype ID wrappers, and the
//! session handle returned by the auth provider.

mod category;
mod enums;
mod ids;
mod session;
mod transaction;

pub use category::{Category, NewCategory};
pub use enums::TransactionKind;
pub use ids::{CategoryId, TransactionId, UserId};
pub use session::Session;
pub use transaction::{NewTransaction, Transaction, TransactionPatch};
