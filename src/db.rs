/*! This module defines and implements traits for interacting with the application's database. */

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Row, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    config::Config,
    stores::sqlite::{SQLiteAccountStore, SQLiteCategoryStore, SQLiteTransactionStore},
};

/// The version of the schema created by [initialize].
///
/// Stored in SQLite's `user_version` header field.
pub const SCHEMA_VERSION: i64 = 1;

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create the table (and indexes) for the model if they do not already exist.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, reading from column `offset` onwards.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if an invalid column index was used.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Open the database described by `config` and make sure its schema is up to date.
///
/// # Errors
/// Returns an error if the file cannot be opened or the schema cannot be created.
pub fn open(config: &Config) -> Result<Connection, Error> {
    let connection = Connection::open(&config.db_path)?;
    connection.busy_timeout(config.busy_timeout)?;

    initialize(&connection)?;

    tracing::info!("Opened database at {:?}", config.db_path);

    Ok(connection)
}

/// Create the tables for the domain models.
///
/// Also turns on foreign key enforcement for `connection`. Safe to call on a
/// database that has already been initialized.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction, so it must come first.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let version: i64 = transaction.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < SCHEMA_VERSION {
        tracing::info!("Migrating database schema from version {version} to {SCHEMA_VERSION}");

        SQLiteAccountStore::create_table(&transaction)?;
        SQLiteCategoryStore::create_table(&transaction)?;
        SQLiteTransactionStore::create_table(&transaction)?;

        transaction.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }

    transaction.commit()?;

    Ok(())
}

/// Acquire the lock on a shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned.
pub fn lock(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

/// Start a unit of work that takes the database write lock up front.
///
/// The transaction rolls back when dropped without calling `commit`.
pub fn begin(connection: &Connection) -> Result<SqlTransaction<'_>, Error> {
    SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use rusqlite::Connection;

    use crate::config::Config;

    use super::{SCHEMA_VERSION, initialize, open};

    #[test]
    fn initialize_sets_schema_version() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let version: i64 = connection
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert_eq!(initialize(&connection), Ok(()));
    }

    #[test]
    fn initialize_enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let enabled: bool = connection
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert!(enabled);
    }

    #[test]
    fn open_creates_tables() {
        let config = Config {
            db_path: PathBuf::from(":memory:"),
            busy_timeout: Duration::from_millis(100),
        };

        let connection = open(&config).unwrap();

        let table_count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('account', 'category', 'transaction')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(table_count, 3);
    }
}
