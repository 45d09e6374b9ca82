//! This file defines the `Category` type and the types needed to create a category.
//! Categories form a tree: a category with no parent is a root category.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId, money::Money};

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is empty or
    /// only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CategoryName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CategoryName::new(&value)
    }
}

impl From<CategoryName> for String {
    fn from(value: CategoryName) -> Self {
        value.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A budget category, e.g. 'Groceries' under 'Food'.
///
/// Subcategories are not stored on the category, query them with
/// [CategoryStore::list_children](crate::stores::CategoryStore::list_children).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: CategoryName,
    /// The parent category, `None` for a root category.
    pub parent_id: Option<CategoryId>,
    /// How much is budgeted for this category alone.
    ///
    /// Targets of subcategories are not included, see
    /// [CategoryStore::target_total](crate::stores::CategoryStore::target_total).
    pub target_amount: Money,
}

impl Category {
    /// Start describing a new root category with a zero target.
    ///
    /// Shortcut for [NewCategory] for discoverability.
    pub fn build(name: CategoryName) -> NewCategory {
        NewCategory {
            name,
            parent_id: None,
            target_amount: Money::ZERO,
        }
    }

    /// Whether the category has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// The data needed to add a category to a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    /// The display name of the category.
    pub name: CategoryName,
    /// The parent category, `None` for a root category.
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    /// How much is budgeted for this category alone.
    #[serde(default)]
    pub target_amount: Money,
}

impl NewCategory {
    /// Set the parent category.
    pub fn parent_id(mut self, parent_id: Option<CategoryId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Set the target amount.
    pub fn target_amount(mut self, target_amount: Money) -> Self {
        self.target_amount = target_amount;
        self
    }
}

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, models::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(CategoryName::new(""), Err(Error::EmptyName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(CategoryName::new("   "), Err(Error::EmptyName));
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        assert!(CategoryName::new("🔥").is_ok())
    }
}
