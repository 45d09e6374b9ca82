//! Implements a SQLite backed transaction store.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    database_id::{AccountId, TransactionId},
    db::{CreateTable, MapRow, begin, lock},
    models::{NewTransaction, Transaction},
    stores::TransactionStore,
};

use super::{SharedConnection, account::get_account, category::get_category};

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction depends on the [Account](crate::models::Account) and
/// [Category](crate::models::Category) models, these models must be set up in the database.
/// The balance of each account is updated in the same SQL transaction as
/// the transaction rows that change it.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: SharedConnection,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: SharedConnection) -> Self {
        Self { connection }
    }

    fn set_archived(&self, id: TransactionId, archived: bool) -> Result<Transaction, Error> {
        let connection = lock(&self.connection)?;
        let transaction = begin(&connection)?;

        let stored = get_transaction(id, &transaction)?.ok_or(Error::NotFound)?;

        if stored.archived == archived {
            return Ok(stored);
        }

        transaction.execute(
            "UPDATE \"transaction\" SET archived = ?1 WHERE id = ?2;",
            (archived, id),
        )?;

        let delta = if archived {
            -stored.amount.minor_units()
        } else {
            stored.amount.minor_units()
        };
        apply_to_balance(stored.account_id, delta, &transaction)?;

        transaction.commit()?;

        tracing::debug!(
            "{} transaction {id}",
            if archived { "Archived" } else { "Restored" }
        );

        Ok(Transaction { archived, ..stored })
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Retrieve all transactions ordered by ID.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn list_all(&self) -> Result<Vec<Transaction>, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT id, date, amount, description, account_id, category_id, archived
                 FROM \"transaction\" ORDER BY id;",
            )?
            .query_map([], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, Error> {
        get_transaction(id, &*lock(&self.connection)?)
    }

    /// Create a new transaction in the database and add its amount to the account balance.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAccount] if `account_id` does not refer to a valid account,
    /// - [Error::InvalidCategory] if `category_id` does not refer to a valid category,
    /// - [Error::AmountOutOfRange] if the new balance would not fit in a `decimal(18,2)`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn add(&self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        let connection = lock(&self.connection)?;
        let transaction = begin(&connection)?;

        check_references(&new_transaction, &transaction)?;

        let created = transaction
            .prepare(
                "INSERT INTO \"transaction\" (date, amount, description, account_id, category_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id, date, amount, description, account_id, category_id, archived;",
            )?
            .query_row(
                (
                    new_transaction.date,
                    new_transaction.amount,
                    &new_transaction.description,
                    new_transaction.account_id,
                    new_transaction.category_id,
                ),
                Self::map_row,
            )?;

        apply_to_balance(created.account_id, created.amount.minor_units(), &transaction)?;

        transaction.commit()?;

        tracing::debug!(
            "Created transaction {} of {} for account {}",
            created.id,
            created.amount,
            created.account_id
        );

        Ok(created)
    }

    /// Update a transaction and move its effect on account balances.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `transaction.id` does not refer to a transaction,
    /// - [Error::InvalidAccount] if `account_id` does not refer to a valid account,
    /// - [Error::InvalidCategory] if `category_id` does not refer to a valid category,
    /// - [Error::AmountOutOfRange] if a new balance would not fit in a `decimal(18,2)`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&self, updated: &Transaction) -> Result<(), Error> {
        let connection = lock(&self.connection)?;
        let transaction = begin(&connection)?;

        let stored = get_transaction(updated.id, &transaction)?.ok_or(Error::NotFound)?;

        check_references(
            &NewTransaction {
                amount: updated.amount,
                date: updated.date,
                description: String::new(),
                account_id: updated.account_id,
                category_id: updated.category_id,
            },
            &transaction,
        )?;

        transaction.execute(
            "UPDATE \"transaction\"
             SET date = ?1, amount = ?2, description = ?3, account_id = ?4, category_id = ?5
             WHERE id = ?6;",
            (
                updated.date,
                updated.amount,
                &updated.description,
                updated.account_id,
                updated.category_id,
                updated.id,
            ),
        )?;

        if stored.archived {
            // Archived transactions do not count towards any balance.
        } else if stored.account_id == updated.account_id {
            // One net change, the balance only has to be in range after the edit.
            apply_to_balance(
                updated.account_id,
                updated.amount.minor_units() - stored.amount.minor_units(),
                &transaction,
            )?;
        } else {
            apply_to_balance(stored.account_id, -stored.amount.minor_units(), &transaction)?;
            apply_to_balance(updated.account_id, updated.amount.minor_units(), &transaction)?;
        }

        transaction.commit()?;

        Ok(())
    }

    /// Delete a transaction and take its amount off the account balance.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let connection = lock(&self.connection)?;
        let transaction = begin(&connection)?;

        let Some(stored) = get_transaction(id, &transaction)? else {
            return Ok(());
        };

        transaction.execute("DELETE FROM \"transaction\" WHERE id = ?1;", [id])?;

        if !stored.archived {
            apply_to_balance(stored.account_id, -stored.amount.minor_units(), &transaction)?;
        }

        transaction.commit()?;

        tracing::debug!("Deleted transaction {id}");

        Ok(())
    }

    /// Retrieve the transactions of an account ordered by ID.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn list_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT id, date, amount, description, account_id, category_id, archived
                 FROM \"transaction\" WHERE account_id = ?1 ORDER BY id;",
            )?
            .query_map([account_id], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    /// Archive a transaction and take its amount off the account balance.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn archive(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.set_archived(id, true)
    }

    /// Restore an archived transaction and add its amount back to the account balance.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a transaction,
    /// - [Error::AmountOutOfRange] if the new balance would not fit in a `decimal(18,2)`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn restore(&self, id: TransactionId) -> Result<Transaction, Error> {
        self.set_archived(id, false)
    }
}

fn get_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Option<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, date, amount, description, account_id, category_id, archived
             FROM \"transaction\" WHERE id = :id;",
        )?
        .query_row(&[(":id", &id)], SQLiteTransactionStore::map_row)
        .optional()
        .map_err(Error::from)
}

fn check_references(transaction: &NewTransaction, connection: &Connection) -> Result<(), Error> {
    if get_account(transaction.account_id, connection)?.is_none() {
        return Err(Error::InvalidAccount(transaction.account_id));
    }

    if get_category(transaction.category_id, connection)?.is_none() {
        return Err(Error::InvalidCategory(transaction.category_id));
    }

    Ok(())
}

/// Add `delta` minor units to the balance of an account in a single statement.
///
/// `delta` may be up to twice the largest amount, the `CHECK` on the balance
/// column decides whether the result is in range.
fn apply_to_balance(
    account_id: AccountId,
    delta: i64,
    connection: &Connection,
) -> Result<(), Error> {
    if delta == 0 {
        return Ok(());
    }

    let rows_affected = connection.execute(
        "UPDATE account SET balance = balance + ?1 WHERE id = ?2;",
        (delta, account_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::InvalidAccount(account_id));
    }

    Ok(())
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                amount INTEGER NOT NULL
                    CHECK (amount BETWEEN -999999999999999999 AND 999999999999999999),
                description TEXT NOT NULL,
                account_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                archived INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY(account_id) REFERENCES account(id),
                FOREIGN KEY(category_id) REFERENCES category(id)
            );

            CREATE INDEX IF NOT EXISTS idx_transaction_account ON \"transaction\"(account_id);
            CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);",
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let date = row.get(offset + 1)?;
        let amount = row.get(offset + 2)?;
        let description = row.get(offset + 3)?;
        let account_id = row.get(offset + 4)?;
        let category_id = row.get(offset + 5)?;
        let archived = row.get(offset + 6)?;

        Ok(Transaction {
            id,
            date,
            amount,
            description,
            account_id,
            category_id,
            archived,
        })
    }
}
