//! Category registry: the built-in set plus user-defined customs.
//!
//! Built-ins are a fixed table compiled into the crate; customs live in
//! the backend and are loaded per session. Name uniqueness is global
//! (trimmed, case-insensitive, across both kinds), so the registry is
//! the single place that can answer "is this name taken".

use crate::models::{Category, CategoryId, TransactionKind};
use crate::validation::{ValidationError, validate_category_name};

/// Default icon for custom income categories.
pub const CUSTOM_INCOME_ICON: &str = "Plus";

/// Default icon for custom expense categories.
pub const CUSTOM_EXPENSE_ICON: &str = "Tag";

/// The built-in category table: `(id, name, icon, kind)`.
const BUILTIN_CATEGORIES: [(&str, &str, &str, TransactionKind); 13] = [
    ("1", "Sueldo", "Wallet", TransactionKind::Income),
    ("2", "Bonificación", "Gift", TransactionKind::Income),
    ("3", "Primas", "Award", TransactionKind::Income),
    ("4", "Trabajo", "Briefcase", TransactionKind::Income),
    ("5", "Otro", "Plus", TransactionKind::Income),
    ("6", "Casa", "Home", TransactionKind::Expense),
    ("7", "Colegio", "GraduationCap", TransactionKind::Expense),
    ("8", "Servicios", "Receipt", TransactionKind::Expense),
    ("9", "Celular", "Smartphone", TransactionKind::Expense),
    ("10", "Créditos", "CreditCard", TransactionKind::Expense),
    ("11", "Otros", "MoreHorizontal", TransactionKind::Expense),
    ("12", "Finca", "Trees", TransactionKind::Expense),
    ("13", "Transporte", "Car", TransactionKind::Expense),
];

/// Materializes the built-in category set.
#[must_use]
pub fn builtin_categories() -> Vec<Category> {
    BUILTIN_CATEGORIES
        .iter()
        .map(|&(id, name, icon, kind)| Category {
            id: CategoryId::from(id),
            name: name.to_owned(),
            icon: icon.to_owned(),
            kind,
        })
        .collect()
}

/// Default icon for a custom category of the given kind.
#[inline]
#[must_use]
pub const fn default_custom_icon(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => CUSTOM_INCOME_ICON,
        TransactionKind::Expense => CUSTOM_EXPENSE_ICON,
    }
}

/// The session's view of all categories.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    /// The fixed built-in set.
    builtins: Vec<Category>,
    /// User-defined categories, in backend order.
    customs: Vec<Category>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryRegistry {
    /// Creates a registry with the built-ins and no customs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builtins: builtin_categories(),
            customs: Vec::new(),
        }
    }

    /// Creates a registry seeded with custom categories loaded from the
    /// backend.
    #[must_use]
    pub fn with_customs(customs: Vec<Category>) -> Self {
        Self {
            builtins: builtin_categories(),
            customs,
        }
    }

    /// All categories, built-ins first, then customs in load order.
    #[must_use]
    pub fn all(&self) -> Vec<Category> {
        let mut all = self.builtins.clone();
        all.extend(self.customs.iter().cloned());
        all
    }

    /// All categories applicable to the given kind.
    #[must_use]
    pub fn of_kind(&self, kind: TransactionKind) -> Vec<Category> {
        self.all().into_iter().filter(|c| c.kind == kind).collect()
    }

    /// The custom categories only.
    #[inline]
    #[must_use]
    pub fn customs(&self) -> &[Category] {
        &self.customs
    }

    /// Returns `true` if the id belongs to a built-in category.
    #[must_use]
    pub fn is_builtin(&self, id: &CategoryId) -> bool {
        self.builtins.iter().any(|c| &c.id == id)
    }

    /// Returns `true` if a category with this name already exists, in
    /// either set, of either kind. Comparison trims and ignores case.
    #[must_use]
    pub fn name_taken(&self, name: &str) -> bool {
        let needle = name.trim().to_lowercase();
        self.builtins
            .iter()
            .chain(self.customs.iter())
            .any(|c| c.name.trim().to_lowercase() == needle)
    }

    /// Checks that `name` is acceptable for a new custom category.
    ///
    /// # Errors
    ///
    /// Returns the length-rule violations of
    /// [`validate_category_name`], or
    /// [`ValidationError::DuplicateCategoryName`] if the trimmed name
    /// collides case-insensitively with any existing category.
    pub fn check_new_name(&self, name: &str) -> Result<(), ValidationError> {
        validate_category_name(name)?;
        if self.name_taken(name) {
            return Err(ValidationError::DuplicateCategoryName(
                name.trim().to_owned(),
            ));
        }
        Ok(())
    }

    /// Appends a custom category confirmed by the backend.
    pub fn insert_custom(&mut self, category: Category) {
        self.customs.push(category);
    }

    /// Removes a custom category by id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BuiltinCategoryImmutable`] when the id
    /// names a built-in. An unknown id is a no-op: the row is already
    /// gone, which is the state the caller asked for.
    pub fn remove_custom(&mut self, id: &CategoryId) -> Result<(), ValidationError> {
        if self.is_builtin(id) {
            return Err(ValidationError::BuiltinCategoryImmutable);
        }
        self.customs.retain(|c| &c.id != id);
        Ok(())
    }
}
