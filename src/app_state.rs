//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    db::initialize,
    stores::sqlite::{SQLiteAccountStore, SQLiteCategoryStore, SQLiteTransactionStore},
};

/// The state of the REST server.
///
/// All stores share the same database connection.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The store for managing accounts.
    pub account_store: SQLiteAccountStore,

    /// The store for managing budget categories.
    pub category_store: SQLiteCategoryStore,

    /// The store for managing transactions.
    pub transaction_store: SQLiteTransactionStore,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            account_store: SQLiteAccountStore::new(connection.clone()),
            category_store: SQLiteCategoryStore::new(connection.clone()),
            transaction_store: SQLiteTransactionStore::new(connection),
        })
    }
}
