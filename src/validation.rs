//! Write-boundary validation.
//!
//! Every rule here runs before any remote call is attempted, so a
//! rejected write never leaves partial state anywhere. Read-side
//! aggregation does not re-defend against these conditions: dates are
//! already [`chrono::NaiveDate`] values and amounts are checked once,
//! on the way in.

use crate::models::{NewTransaction, TransactionPatch};

/// Maximum accepted amount for a single transaction.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// Maximum length of a transaction description.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Maximum length of a category name.
pub const MAX_CATEGORY_NAME_LEN: usize = 30;

/// Password length bounds.
pub const PASSWORD_LEN: core::ops::RangeInclusive<usize> = 6..=100;

/// Display-name length bounds.
pub const DISPLAY_NAME_LEN: core::ops::RangeInclusive<usize> = 2..=50;

/// Maximum length of an email address.
pub const MAX_EMAIL_LEN: usize = 255;

/// A write rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Amount was zero or negative.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// Amount exceeded [`MAX_AMOUNT`].
    #[error("amount is too large")]
    AmountTooLarge,

    /// Description was empty after trimming.
    #[error("description is required")]
    EmptyDescription,

    /// Description exceeded [`MAX_DESCRIPTION_LEN`].
    #[error("description is too long (max {MAX_DESCRIPTION_LEN} characters)")]
    DescriptionTooLong,

    /// Category label was empty after trimming.
    #[error("category is required")]
    EmptyCategory,

    /// Category name was empty after trimming.
    #[error("category name is required")]
    EmptyCategoryName,

    /// Category name exceeded [`MAX_CATEGORY_NAME_LEN`].
    #[error("category name is too long (max {MAX_CATEGORY_NAME_LEN} characters)")]
    CategoryNameTooLong,

    /// Category name collided (case-insensitively) with an existing
    /// category of either kind.
    #[error("a category named \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// Built-in categories cannot be deleted.
    #[error("built-in categories cannot be deleted")]
    BuiltinCategoryImmutable,

    /// Copy target month fell outside `0..=11`.
    #[error("target month must be between 0 and 11")]
    InvalidTargetMonth,

    /// Email was empty, too long, or structurally implausible.
    #[error("invalid email address")]
    InvalidEmail,

    /// Password fell outside [`PASSWORD_LEN`].
    #[error("password must be between 6 and 100 characters")]
    InvalidPasswordLength,

    /// Display name fell outside [`DISPLAY_NAME_LEN`] after trimming.
    #[error("display name must be between 2 and 50 characters")]
    InvalidDisplayNameLength,
}

/// Validates a transaction creation payload.
///
/// # Errors
///
/// Returns the first violated rule: positive bounded amount, non-empty
/// bounded description, non-empty category label.
pub fn validate_new_transaction(new: &NewTransaction) -> Result<(), ValidationError> {
    validate_amount(new.amount)?;
    validate_description(&new.description)?;
    if new.category.trim().is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    Ok(())
}

/// Validates the fields set on a transaction patch.
///
/// Unset fields are not validated — a patch only answers for what it
/// changes.
///
/// # Errors
///
/// Returns the first violated rule among the set fields.
pub fn validate_patch(patch: &TransactionPatch) -> Result<(), ValidationError> {
    if let Some(amount) = patch.amount {
        validate_amount(amount)?;
    }
    if let Some(description) = &patch.description {
        validate_description(description)?;
    }
    if let Some(category) = &patch.category {
        if category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
    }
    Ok(())
}

/// Validates a monetary amount: strictly positive and bounded.
///
/// # Errors
///
/// Returns [`ValidationError::NonPositiveAmount`] or
/// [`ValidationError::AmountTooLarge`].
pub fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if !(amount > 0.0) {
        return Err(ValidationError::NonPositiveAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge);
    }
    Ok(())
}

/// Validates a transaction description.
fn validate_description(description: &str) -> Result<(), ValidationError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(())
}

/// Validates a category name (length rules only; uniqueness is checked
/// against the registry).
///
/// # Errors
///
/// Returns [`ValidationError::EmptyCategoryName`] or
/// [`ValidationError::CategoryNameTooLong`].
pub fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyCategoryName);
    }
    if trimmed.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(ValidationError::CategoryNameTooLong);
    }
    Ok(())
}

/// Validates an email address: trimmed, bounded, with a plausible
/// `local@domain.tld` shape. Deliverability is the provider's problem.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidEmail`].
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_EMAIL_LEN {
        return Err(ValidationError::InvalidEmail);
    }
    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Validates a password length.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPasswordLength`].
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if PASSWORD_LEN.contains(&password.chars().count()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPasswordLength)
    }
}

/// Validates a display name (trimmed length bounds).
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDisplayNameLength`].
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if DISPLAY_NAME_LEN.contains(&name.trim().chars().count()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidDisplayNameLength)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use chrono::NaiveDate;

    fn new_tx(amount: f64, description: &str, category: &str) -> NewTransaction {
        NewTransaction {
            kind: TransactionKind::Expense,
            amount,
            description: description.to_owned(),
            category: category.to_owned(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            is_pending: false,
            linked_income_ids: Vec::new(),
        }
    }

    #[test]
    fn rejects_zero_and_negative_amounts() {
        assert_eq!(
            validate_new_transaction(&new_tx(0.0, "x", "Casa")),
            Err(ValidationError::NonPositiveAmount)
        );
        assert_eq!(
            validate_new_transaction(&new_tx(-5.0, "x", "Casa")),
            Err(ValidationError::NonPositiveAmount)
        );
        assert_eq!(validate_amount(f64::NAN), Err(ValidationError::NonPositiveAmount));
    }

    #[test]
    fn rejects_oversized_amount() {
        assert_eq!(
            validate_new_transaction(&new_tx(MAX_AMOUNT * 2.0, "x", "Casa")),
            Err(ValidationError::AmountTooLarge)
        );
        assert!(validate_new_transaction(&new_tx(MAX_AMOUNT, "x", "Casa")).is_ok());
    }

    #[test]
    fn rejects_blank_description_and_category() {
        assert_eq!(
            validate_new_transaction(&new_tx(1.0, "   ", "Casa")),
            Err(ValidationError::EmptyDescription)
        );
        assert_eq!(
            validate_new_transaction(&new_tx(1.0, "x", " ")),
            Err(ValidationError::EmptyCategory)
        );
    }

    #[test]
    fn rejects_overlong_description() {
        let long = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        assert_eq!(
            validate_new_transaction(&new_tx(1.0, &long, "Casa")),
            Err(ValidationError::DescriptionTooLong)
        );
    }

    #[test]
    fn patch_validates_only_set_fields() {
        let patch = TransactionPatch::new().is_pending(true);
        assert!(validate_patch(&patch).is_ok());
        let bad = TransactionPatch::new().amount(-1.0);
        assert_eq!(validate_patch(&bad), Err(ValidationError::NonPositiveAmount));
    }

    #[test]
    fn category_name_rules() {
        assert_eq!(validate_category_name("  "), Err(ValidationError::EmptyCategoryName));
        let long = "x".repeat(MAX_CATEGORY_NAME_LEN + 1);
        assert_eq!(validate_category_name(&long), Err(ValidationError::CategoryNameTooLong));
        assert!(validate_category_name(" Entretenimiento ").is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email(" ana@example.com ").is_ok());
        assert_eq!(validate_email("ana"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("@example.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("ana@"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("ana@localhost"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn password_bounds() {
        assert_eq!(validate_password("12345"), Err(ValidationError::InvalidPasswordLength));
        assert!(validate_password("123456").is_ok());
        assert_eq!(
            validate_password(&"x".repeat(101)),
            Err(ValidationError::InvalidPasswordLength)
        );
    }

    #[test]
    fn display_name_bounds() {
        assert_eq!(
            validate_display_name(" a "),
            Err(ValidationError::InvalidDisplayNameLength)
        );
        assert!(validate_display_name("Ana María").is_ok());
    }
}
