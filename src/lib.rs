//! Rust client library and domain core for the Plata personal-finance app.
//!
//! Plata users log incomes and expenses, tag them with categories, mark
//! items pending or paid, link expenses to the incomes that funded them,
//! and view monthly and annual summaries. This crate provides the typed
//! data model, the pure ledger aggregation and income-linking logic, and
//! an HTTP client for the managed backend (auth, record tables, avatar
//! storage, and the server-side account-deletion function).
//!
//! The entry point for applications is [`finance::Finance`], a
//! per-session service combining a [`store::RecordStore`] backend with
//! the in-memory ledger. The aggregation itself lives in [`ledger`] and
//! [`linking`] as pure functions and is usable without any backend.

pub mod categories;
pub mod client;
pub mod error;
pub mod finance;
pub mod ledger;
pub mod linking;
pub mod models;
pub mod store;
pub mod validation;
