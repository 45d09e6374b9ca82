//! Defines the category store trait.

use serde::Deserialize;

use crate::{
    Error,
    database_id::CategoryId,
    models::{Category, NewCategory},
    money::Money,
};

/// What to do with a category's subcategories when the category is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryDeletePolicy {
    /// Refuse to delete a category that has subcategories.
    #[default]
    Reject,
    /// Move the subcategories up to the deleted category's parent.
    ReassignChildren,
    /// Delete the category and all of its descendants.
    Cascade,
}

/// Creates, retrieves, updates and deletes budget categories.
pub trait CategoryStore {
    /// Get every category in the order they were added.
    fn list_all(&self) -> Result<Vec<Category>, Error>;

    /// Get a category by its ID, `None` if there is no such category.
    fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, Error>;

    /// Add a category to the store and return it with its assigned ID.
    fn add(&self, category: NewCategory) -> Result<Category, Error>;

    /// Replace the name, parent and target of an existing category.
    fn update(&self, category: &Category) -> Result<(), Error>;

    /// Delete a category that has no subcategories.
    ///
    /// Deleting an ID that does not exist succeeds without doing anything.
    fn delete(&self, id: CategoryId) -> Result<(), Error> {
        self.delete_with_policy(id, CategoryDeletePolicy::Reject)
    }

    /// Delete a category, applying `policy` to its subcategories.
    fn delete_with_policy(&self, id: CategoryId, policy: CategoryDeletePolicy)
    -> Result<(), Error>;

    /// Get the direct subcategories of `parent_id`.
    fn list_children(&self, parent_id: CategoryId) -> Result<Vec<Category>, Error>;

    /// Get the categories that have no parent.
    fn list_roots(&self) -> Result<Vec<Category>, Error>;

    /// The target of a category plus the targets of all its descendants,
    /// `None` if there is no such category.
    fn target_total(&self, id: CategoryId) -> Result<Option<Money>, Error>;
}
