//! Enumeration types for constrained values.

use serde::{Deserialize, Serialize};

/// Direction of a ledger entry.
///
/// The classification is immutable for the lifetime of a record; amounts
/// are always positive magnitudes and the direction is carried here, not
/// in the sign of the amount. Categories are scoped by the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl TransactionKind {
    /// Returns `true` for [`Self::Income`].
    #[inline]
    #[must_use]
    pub const fn is_income(self) -> bool {
        matches!(self, Self::Income)
    }

    /// Returns `true` for [`Self::Expense`].
    #[inline]
    #[must_use]
    pub const fn is_expense(self) -> bool {
        matches!(self, Self::Expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serde_lowercase() {
        assert_eq!(serde_json::to_string(&TransactionKind::Income).unwrap(), r#""income""#);
        assert_eq!(serde_json::to_string(&TransactionKind::Expense).unwrap(), r#""expense""#);
        let kind: TransactionKind = serde_json::from_str(r#""expense""#).unwrap();
        assert_eq!(kind, TransactionKind::Expense);
    }

    #[test]
    fn kind_predicates() {
        assert!(TransactionKind::Income.is_income());
        assert!(!TransactionKind::Income.is_expense());
        assert!(TransactionKind::Expense.is_expense());
    }
}
