//! Category model.

use serde::{Deserialize, Serialize};

use super::{CategoryId, TransactionKind};

/// A transaction category.
///
/// Transactions reference categories by `name`, not by id, so removing
/// a category simply orphans the label on existing records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier.
    pub id: CategoryId,
    /// Display name, also the matching key (unique case-insensitively
    /// across both kinds).
    pub name: String,
    /// Symbolic glyph name for presentation.
    pub icon: String,
    /// Whether the category applies to incomes or expenses.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// Payload for creating a custom category.
///
/// The backend assigns the id and returns the created row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCategory {
    /// Display name (trimmed before submission).
    pub name: String,
    /// Symbolic glyph name.
    pub icon: String,
    /// Whether the category applies to incomes or expenses.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}
