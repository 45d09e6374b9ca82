//! Implements a SQLite backed category store.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    database_id::CategoryId,
    db::{CreateTable, MapRow, begin, lock},
    models::{Category, CategoryName, NewCategory},
    money::Money,
    stores::{CategoryDeletePolicy, CategoryStore},
};

use super::SharedConnection;

/// Selects the ID of a category (`?1`) and the IDs of all its descendants.
const SUBTREE_CTE: &str = "WITH RECURSIVE subtree(id) AS (
        SELECT ?1
        UNION
        SELECT category.id FROM category JOIN subtree ON category.parent_id = subtree.id
    )";

/// Creates, retrieves, updates and deletes categories in a SQLite database.
///
/// Keeps the categories a tree: parents must exist and a category can never
/// become its own ancestor.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: SharedConnection,
}

impl SQLiteCategoryStore {
    /// Create a new category store with a SQLite database.
    pub fn new(connection: SharedConnection) -> Self {
        Self { connection }
    }

    fn query_categories(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Category>, Error> {
        lock(&self.connection)?
            .prepare(sql)?
            .query_map(params, Self::map_row)?
            .map(|maybe_category| maybe_category.map_err(Error::from))
            .collect()
    }
}

impl CategoryStore for SQLiteCategoryStore {
    /// Retrieve all categories ordered by ID.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn list_all(&self) -> Result<Vec<Category>, Error> {
        self.query_categories(
            "SELECT id, name, parent_id, target_amount FROM category ORDER BY id;",
            [],
        )
    }

    /// Retrieve the category with `id`.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, Error> {
        get_category(id, &*lock(&self.connection)?)
    }

    /// Create a category in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidParentCategory] if the parent ID does not refer to a category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn add(&self, category: NewCategory) -> Result<Category, Error> {
        let category = lock(&self.connection)?
            .prepare(
                "INSERT INTO category (name, parent_id, target_amount) VALUES (?1, ?2, ?3)
                 RETURNING id, name, parent_id, target_amount;",
            )?
            .query_row(
                (
                    category.name.as_ref(),
                    category.parent_id,
                    category.target_amount,
                ),
                Self::map_row,
            )
            .map_err(|error| match (Error::from(error), category.parent_id) {
                (Error::InvalidForeignKey, Some(parent_id)) => {
                    Error::InvalidParentCategory(parent_id)
                }
                (error, _) => error,
            })?;

        tracing::debug!("Created category {} \"{}\"", category.id, category.name);

        Ok(category)
    }

    /// Update the name, parent and target amount of a category.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `category.id` does not refer to a category,
    /// - [Error::InvalidParentCategory] if the new parent does not exist,
    /// - [Error::CategoryCycle] if the new parent is the category or one of its descendants,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&self, category: &Category) -> Result<(), Error> {
        let connection = lock(&self.connection)?;
        let transaction = begin(&connection)?;

        if get_category(category.id, &transaction)?.is_none() {
            return Err(Error::NotFound);
        }

        if let Some(parent_id) = category.parent_id {
            if get_category(parent_id, &transaction)?.is_none() {
                return Err(Error::InvalidParentCategory(parent_id));
            }

            if is_in_subtree(parent_id, category.id, &transaction)? {
                return Err(Error::CategoryCycle);
            }
        }

        transaction.execute(
            "UPDATE category SET name = ?1, parent_id = ?2, target_amount = ?3 WHERE id = ?4;",
            (
                category.name.as_ref(),
                category.parent_id,
                category.target_amount,
                category.id,
            ),
        )?;
        transaction.commit()?;

        Ok(())
    }

    /// Delete a category.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::CategoryHasChildren] if `policy` is [CategoryDeletePolicy::Reject]
    ///   and the category has subcategories,
    /// - [Error::CategoryInUse] if a transaction refers to a category that would be deleted,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete_with_policy(
        &self,
        id: CategoryId,
        policy: CategoryDeletePolicy,
    ) -> Result<(), Error> {
        let connection = lock(&self.connection)?;
        let transaction = begin(&connection)?;

        let Some(category) = get_category(id, &transaction)? else {
            return Ok(());
        };

        let child_count: i64 = transaction.query_row(
            "SELECT COUNT(id) FROM category WHERE parent_id = ?1;",
            [id],
            |row| row.get(0),
        )?;

        let cascade = policy == CategoryDeletePolicy::Cascade;
        let transactions_in_use: i64 = if cascade {
            transaction.query_row(
                &format!(
                    "{SUBTREE_CTE} SELECT COUNT(id) FROM \"transaction\"
                     WHERE category_id IN (SELECT id FROM subtree);"
                ),
                [id],
                |row| row.get(0),
            )?
        } else {
            transaction.query_row(
                "SELECT COUNT(id) FROM \"transaction\" WHERE category_id = ?1;",
                [id],
                |row| row.get(0),
            )?
        };

        if transactions_in_use > 0 {
            return Err(Error::CategoryInUse);
        }

        let rows_affected = match policy {
            CategoryDeletePolicy::Reject if child_count > 0 => {
                return Err(Error::CategoryHasChildren);
            }
            CategoryDeletePolicy::Reject => {
                transaction.execute("DELETE FROM category WHERE id = ?1;", [id])?
            }
            CategoryDeletePolicy::ReassignChildren => {
                transaction.execute(
                    "UPDATE category SET parent_id = ?1 WHERE parent_id = ?2;",
                    (category.parent_id, id),
                )?;
                transaction.execute("DELETE FROM category WHERE id = ?1;", [id])?
            }
            CategoryDeletePolicy::Cascade => transaction.execute(
                &format!("{SUBTREE_CTE} DELETE FROM category WHERE id IN (SELECT id FROM subtree);"),
                [id],
            )?,
        };

        transaction.commit()?;

        tracing::info!(
            "Deleted {rows_affected} categor{} starting from {id} with policy {policy:?}",
            if rows_affected == 1 { "y" } else { "ies" }
        );

        Ok(())
    }

    /// Retrieve the direct subcategories of `parent_id` ordered by ID.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn list_children(&self, parent_id: CategoryId) -> Result<Vec<Category>, Error> {
        self.query_categories(
            "SELECT id, name, parent_id, target_amount FROM category
             WHERE parent_id = ?1 ORDER BY id;",
            [parent_id],
        )
    }

    /// Retrieve the categories without a parent ordered by ID.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn list_roots(&self) -> Result<Vec<Category>, Error> {
        self.query_categories(
            "SELECT id, name, parent_id, target_amount FROM category
             WHERE parent_id IS NULL ORDER BY id;",
            [],
        )
    }

    /// Sum the targets of the category with `id` and all of its descendants.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::AmountOutOfRange] if the sum does not fit in a `decimal(18,2)`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn target_total(&self, id: CategoryId) -> Result<Option<Money>, Error> {
        let connection = lock(&self.connection)?;

        if get_category(id, &connection)?.is_none() {
            return Ok(None);
        }

        // Summed here rather than with SQL `SUM`, which fails on i64 overflow.
        let total: i128 = connection
            .prepare(&format!(
                "{SUBTREE_CTE} SELECT target_amount FROM category
                 WHERE id IN (SELECT id FROM subtree);"
            ))?
            .query_map([id], |row| row.get::<_, Money>(0))?
            .map(|maybe_target| maybe_target.map(|target| i128::from(target.minor_units())))
            .sum::<Result<i128, rusqlite::Error>>()?;

        i64::try_from(total)
            .map_err(|_| Error::AmountOutOfRange(total.to_string()))
            .and_then(Money::from_minor_units)
            .map(Some)
    }
}

/// Retrieve a category with a connection the caller has already locked.
pub(super) fn get_category(
    id: CategoryId,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare("SELECT id, name, parent_id, target_amount FROM category WHERE id = :id;")?
        .query_row(&[(":id", &id)], SQLiteCategoryStore::map_row)
        .optional()
        .map_err(Error::from)
}

/// Whether `id` is `root_id` or one of its descendants.
fn is_in_subtree(id: CategoryId, root_id: CategoryId, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            &format!("{SUBTREE_CTE} SELECT EXISTS (SELECT 1 FROM subtree WHERE id = ?2);"),
            [root_id, id],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

impl CreateTable for SQLiteCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                parent_id INTEGER,
                target_amount INTEGER NOT NULL
                    CHECK (target_amount BETWEEN -999999999999999999 AND 999999999999999999),
                FOREIGN KEY(parent_id) REFERENCES category(id)
            );

            CREATE INDEX IF NOT EXISTS idx_category_parent ON category(parent_id);",
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteCategoryStore {
    type ReturnType = Category;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let raw_name: String = row.get(offset + 1)?;
        let parent_id = row.get(offset + 2)?;
        let target_amount = row.get(offset + 3)?;

        Ok(Category {
            id,
            name: CategoryName::new_unchecked(&raw_name),
            parent_id,
            target_amount,
        })
    }
}
