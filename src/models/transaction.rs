//! Transaction model and its write-side companions.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::{TransactionId, TransactionKind};

/// Deserializes a nullable array column into an empty vector.
///
/// The backend stores `linked_income_ids` as a nullable array; older
/// rows carry `null` where newer rows carry `[]`.
fn null_to_empty<'de, D>(deserializer: D) -> Result<Vec<TransactionId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// A single ledger entry.
///
/// `amount` is always a positive magnitude; direction is carried by
/// `kind`. `date` is a plain calendar date with no timezone — it is
/// parsed from the literal `YYYY-MM-DD` column value, so month/year
/// bucketing can never shift across a timezone boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, assigned by the backend at creation.
    pub id: TransactionId,
    /// Income or expense. Immutable classification.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Positive monetary magnitude, single implicit currency.
    pub amount: f64,
    /// Free-text description.
    pub description: String,
    /// Category label. A soft reference by name: deleting or renaming
    /// a category leaves this text untouched.
    pub category: String,
    /// Calendar date of the entry.
    pub date: NaiveDate,
    /// Whether the entry is recorded but not yet settled/paid.
    pub is_pending: bool,
    /// Incomes considered to fund this expense. Only meaningful when
    /// `kind` is [`TransactionKind::Expense`].
    #[serde(default, deserialize_with = "null_to_empty")]
    pub linked_income_ids: Vec<TransactionId>,
}

impl Transaction {
    /// Returns `true` if this is an expense with at least one linked
    /// income.
    #[inline]
    #[must_use]
    pub fn has_linked_incomes(&self) -> bool {
        self.kind.is_expense() && !self.linked_income_ids.is_empty()
    }
}

/// Payload for creating a transaction.
///
/// The backend assigns the id and returns the created row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Positive monetary magnitude.
    pub amount: f64,
    /// Free-text description.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Calendar date of the entry.
    pub date: NaiveDate,
    /// Whether the entry starts out pending.
    pub is_pending: bool,
    /// Funding incomes, for expenses.
    pub linked_income_ids: Vec<TransactionId>,
}

/// Partial update for a transaction.
///
/// Only fields that are `Some` are sent to the backend and applied
/// locally; everything else is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionPatch {
    /// New classification, if changing.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    /// New amount, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// New description, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New category label, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New date, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// New pending flag, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pending: Option<bool>,
    /// Replacement linked-income set, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_income_ids: Option<Vec<TransactionId>>,
}

impl TransactionPatch {
    /// Creates an empty patch.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the amount.
    #[inline]
    #[must_use]
    pub const fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the description.
    #[inline]
    #[must_use]
    pub fn description<T: Into<String>>(mut self, description: T) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category label.
    #[inline]
    #[must_use]
    pub fn category<T: Into<String>>(mut self, category: T) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the date.
    #[inline]
    #[must_use]
    pub const fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the pending flag.
    #[inline]
    #[must_use]
    pub const fn is_pending(mut self, pending: bool) -> Self {
        self.is_pending = Some(pending);
        self
    }

    /// Replaces the linked-income set.
    #[inline]
    #[must_use]
    pub fn linked_income_ids(mut self, ids: Vec<TransactionId>) -> Self {
        self.linked_income_ids = Some(ids);
        self
    }

    /// Returns `true` if no field is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.date.is_none()
            && self.is_pending.is_none()
            && self.linked_income_ids.is_none()
    }

    /// Applies the set fields to a transaction in place.
    pub fn apply(&self, transaction: &mut Transaction) {
        if let Some(kind) = self.kind {
            transaction.kind = kind;
        }
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(description) = &self.description {
            transaction.description.clone_from(description);
        }
        if let Some(category) = &self.category {
            transaction.category.clone_from(category);
        }
        if let Some(date) = self.date {
            transaction.date = date;
        }
        if let Some(pending) = self.is_pending {
            transaction.is_pending = pending;
        }
        if let Some(ids) = &self.linked_income_ids {
            transaction.linked_income_ids.clone_from(ids);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_row_with_null_links() {
        let json = r#"{
            "id": "t-1",
            "user_id": "u-1",
            "type": "expense",
            "amount": 450000,
            "description": "Mercado del Mes",
            "category": "Casa",
            "date": "2025-01-14",
            "is_pending": false,
            "linked_income_ids": null,
            "created_at": "2025-01-14T10:00:00Z",
            "updated_at": "2025-01-14T10:00:00Z"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, TransactionId::from("t-1"));
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert!(tx.linked_income_ids.is_empty());
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2025, 1, 14).unwrap());
    }

    #[test]
    fn deserialize_row_with_links() {
        let json = r#"{
            "id": "t-2",
            "type": "expense",
            "amount": 800000.0,
            "description": "Arriendo",
            "category": "Casa",
            "date": "2025-01-01",
            "is_pending": true,
            "linked_income_ids": ["i-1", "i-2"]
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert!(tx.is_pending);
        assert!(tx.has_linked_incomes());
        assert_eq!(tx.linked_income_ids.len(), 2);
    }

    #[test]
    fn date_is_parsed_from_literal_components() {
        // A month-end date must stay on its literal day regardless of
        // the runtime timezone.
        let json = r#"{
            "id": "t-3",
            "type": "income",
            "amount": 100.0,
            "description": "x",
            "category": "Sueldo",
            "date": "2025-01-31",
            "is_pending": false
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        use chrono::Datelike;
        assert_eq!(tx.date.year(), 2025);
        assert_eq!(tx.date.month0(), 0);
        assert_eq!(tx.date.day(), 31);
    }

    #[test]
    fn serialize_roundtrip() {
        let tx = Transaction {
            id: TransactionId::from("t-1"),
            kind: TransactionKind::Income,
            amount: 5_000_000.0,
            description: "Salario Mensual".to_owned(),
            category: "Sueldo".to_owned(),
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            is_pending: false,
            linked_income_ids: Vec::new(),
        };
        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains(r#""type":"income""#));
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, tx);
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = TransactionPatch::new().is_pending(true);
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"is_pending":true}"#);
    }

    #[test]
    fn patch_apply_is_partial() {
        let mut tx = Transaction {
            id: TransactionId::from("t-1"),
            kind: TransactionKind::Expense,
            amount: 100.0,
            description: "old".to_owned(),
            category: "Casa".to_owned(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            is_pending: false,
            linked_income_ids: Vec::new(),
        };
        let patch = TransactionPatch::new()
            .amount(250.0)
            .linked_income_ids(vec![TransactionId::from("i-1")]);
        patch.apply(&mut tx);
        assert!((tx.amount - 250.0).abs() < f64::EPSILON);
        assert_eq!(tx.description, "old");
        assert_eq!(tx.linked_income_ids, vec![TransactionId::from("i-1")]);
    }

    #[test]
    fn empty_patch_reports_empty() {
        assert!(TransactionPatch::new().is_empty());
        assert!(!TransactionPatch::new().amount(1.0).is_empty());
    }
}
