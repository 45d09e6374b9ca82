//! Implements a SQLite backed account store.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    database_id::AccountId,
    db::{CreateTable, MapRow, begin, lock},
    models::{Account, AccountName, NewAccount},
    stores::{AccountDeletePolicy, AccountStore},
};

use super::SharedConnection;

/// Creates, retrieves, updates and deletes accounts in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteAccountStore {
    connection: SharedConnection,
}

impl SQLiteAccountStore {
    /// Create a new account store with a SQLite database.
    pub fn new(connection: SharedConnection) -> Self {
        Self { connection }
    }
}

impl AccountStore for SQLiteAccountStore {
    /// Retrieve all accounts ordered by ID.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn list_all(&self) -> Result<Vec<Account>, Error> {
        lock(&self.connection)?
            .prepare("SELECT id, name, account_type, balance FROM account ORDER BY id;")?
            .query_map([], Self::map_row)?
            .map(|maybe_account| maybe_account.map_err(Error::from))
            .collect()
    }

    /// Retrieve the account with `id`.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, Error> {
        get_account(id, &*lock(&self.connection)?)
    }

    /// Create an account in the database.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn add(&self, account: NewAccount) -> Result<Account, Error> {
        let account = lock(&self.connection)?
            .prepare(
                "INSERT INTO account (name, account_type, balance) VALUES (?1, ?2, ?3)
                 RETURNING id, name, account_type, balance;",
            )?
            .query_row(
                (account.name.as_ref(), account.account_type, account.balance),
                Self::map_row,
            )?;

        tracing::debug!("Created account {} \"{}\"", account.id, account.name);

        Ok(account)
    }

    /// Update the name and type of an account.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `account.id` does not refer to an account,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&self, account: &Account) -> Result<(), Error> {
        let rows_affected = lock(&self.connection)?.execute(
            "UPDATE account SET name = ?1, account_type = ?2 WHERE id = ?3;",
            (account.name.as_ref(), account.account_type, account.id),
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Delete an account.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::AccountHasTransactions] if `policy` is [AccountDeletePolicy::Reject]
    ///   and transactions refer to the account,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete_with_policy(&self, id: AccountId, policy: AccountDeletePolicy) -> Result<(), Error> {
        let connection = lock(&self.connection)?;
        let transaction = begin(&connection)?;

        let transaction_count: i64 = transaction.query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE account_id = ?1;",
            [id],
            |row| row.get(0),
        )?;

        if transaction_count > 0 {
            match policy {
                AccountDeletePolicy::Reject => return Err(Error::AccountHasTransactions),
                AccountDeletePolicy::Cascade => {
                    transaction
                        .execute("DELETE FROM \"transaction\" WHERE account_id = ?1;", [id])?;
                }
            }
        }

        let rows_affected = transaction.execute("DELETE FROM account WHERE id = ?1;", [id])?;
        transaction.commit()?;

        if rows_affected != 0 {
            tracing::info!("Deleted account {id} and {transaction_count} transaction(s)");
        }

        Ok(())
    }
}

/// Retrieve an account with a connection the caller has already locked.
pub(super) fn get_account(id: AccountId, connection: &Connection) -> Result<Option<Account>, Error> {
    connection
        .prepare("SELECT id, name, account_type, balance FROM account WHERE id = :id;")?
        .query_row(&[(":id", &id)], SQLiteAccountStore::map_row)
        .optional()
        .map_err(Error::from)
}

impl CreateTable for SQLiteAccountStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS account (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                account_type INTEGER NOT NULL CHECK (account_type BETWEEN 0 AND 3),
                balance INTEGER NOT NULL
                    CHECK (balance BETWEEN -999999999999999999 AND 999999999999999999)
            );",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteAccountStore {
    type ReturnType = Account;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let raw_name: String = row.get(offset + 1)?;
        let account_type = row.get(offset + 2)?;
        let balance = row.get(offset + 3)?;

        Ok(Account {
            id,
            name: AccountName::new_unchecked(&raw_name),
            account_type,
            balance,
        })
    }
}

#[cfg(test)]
mod account_store_tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        models::{Account, AccountName, AccountType, Category, CategoryName, Transaction},
        money::Money,
        stores::{
            AccountDeletePolicy, AccountStore, CategoryStore, TransactionStore,
            sqlite::{
                SQLiteAccountStore, SQLiteCategoryStore, SQLiteTransactionStore,
                test_utils::must_create_test_connection,
            },
        },
    };

    fn get_test_store() -> SQLiteAccountStore {
        SQLiteAccountStore::new(must_create_test_connection())
    }

    fn money(value: rust_decimal::Decimal) -> Money {
        Money::new(value).unwrap()
    }

    #[test]
    fn add_then_get_returns_same_account() {
        let store = get_test_store();
        let new_account = Account::build(AccountName::new("Everyday").unwrap(), AccountType::Checking)
            .balance(money(dec!(123.45)));

        let added = store.add(new_account.clone()).unwrap();
        let fetched = store.get_by_id(added.id).unwrap();

        assert!(added.id > 0);
        assert_eq!(fetched, Some(added.clone()));
        assert_eq!(added.name, new_account.name);
        assert_eq!(added.account_type, new_account.account_type);
        assert_eq!(added.balance, new_account.balance);
    }

    #[test]
    fn get_missing_account_returns_none() {
        let store = get_test_store();

        assert_eq!(store.get_by_id(999), Ok(None));
    }

    #[test]
    fn list_all_is_empty_for_new_store() {
        let store = get_test_store();

        assert_eq!(store.list_all(), Ok(vec![]));
    }

    #[test]
    fn list_all_returns_accounts_in_insertion_order() {
        let store = get_test_store();
        let first = store
            .add(Account::build(AccountName::new_unchecked("B"), AccountType::Savings))
            .unwrap();
        let second = store
            .add(Account::build(AccountName::new_unchecked("A"), AccountType::Loan))
            .unwrap();

        assert_eq!(store.list_all(), Ok(vec![first, second]));
    }

    #[test]
    fn update_replaces_name_and_type_but_not_balance() {
        let store = get_test_store();
        let account = store
            .add(
                Account::build(AccountName::new_unchecked("Card"), AccountType::Checking)
                    .balance(money(dec!(10))),
            )
            .unwrap();

        let edited = Account {
            name: AccountName::new_unchecked("Visa"),
            account_type: AccountType::Credit,
            balance: money(dec!(99999)),
            ..account.clone()
        };
        store.update(&edited).unwrap();

        let got = store.get_by_id(account.id).unwrap().unwrap();
        assert_eq!(got.name, edited.name);
        assert_eq!(got.account_type, AccountType::Credit);
        assert_eq!(got.balance, account.balance);
    }

    #[test]
    fn update_missing_account_returns_not_found() {
        let store = get_test_store();
        let account = Account {
            id: 42,
            name: AccountName::new_unchecked("Ghost"),
            account_type: AccountType::Savings,
            balance: Money::ZERO,
        };

        assert_eq!(store.update(&account), Err(Error::NotFound));
    }

    #[test]
    fn delete_is_idempotent() {
        let store = get_test_store();
        let account = store
            .add(Account::build(AccountName::new_unchecked("Gone"), AccountType::Savings))
            .unwrap();

        assert_eq!(store.delete(account.id), Ok(()));
        assert_eq!(store.delete(account.id), Ok(()));
        assert_eq!(store.get_by_id(account.id), Ok(None));
    }

    #[test]
    fn delete_account_with_transactions_is_rejected() {
        let connection = must_create_test_connection();
        let accounts = SQLiteAccountStore::new(connection.clone());
        let categories = SQLiteCategoryStore::new(connection.clone());
        let transactions = SQLiteTransactionStore::new(connection);
        let account = accounts
            .add(Account::build(AccountName::new_unchecked("Main"), AccountType::Checking))
            .unwrap();
        let category = categories
            .add(Category::build(CategoryName::new_unchecked("Food")))
            .unwrap();
        transactions
            .add(Transaction::build(
                money(dec!(-5)),
                date!(2024 - 01 - 01),
                "",
                account.id,
                category.id,
            ))
            .unwrap();

        assert_eq!(accounts.delete(account.id), Err(Error::AccountHasTransactions));
        assert!(accounts.get_by_id(account.id).unwrap().is_some());
    }

    #[test]
    fn cascade_delete_removes_transactions() {
        let connection = must_create_test_connection();
        let accounts = SQLiteAccountStore::new(connection.clone());
        let categories = SQLiteCategoryStore::new(connection.clone());
        let transactions = SQLiteTransactionStore::new(connection);
        let account = accounts
            .add(Account::build(AccountName::new_unchecked("Main"), AccountType::Checking))
            .unwrap();
        let other_account = accounts
            .add(Account::build(AccountName::new_unchecked("Other"), AccountType::Savings))
            .unwrap();
        let category = categories
            .add(Category::build(CategoryName::new_unchecked("Food")))
            .unwrap();
        transactions
            .add(Transaction::build(
                money(dec!(-5)),
                date!(2024 - 01 - 01),
                "",
                account.id,
                category.id,
            ))
            .unwrap();
        let kept = transactions
            .add(Transaction::build(
                money(dec!(7)),
                date!(2024 - 01 - 02),
                "",
                other_account.id,
                category.id,
            ))
            .unwrap();

        accounts
            .delete_with_policy(account.id, AccountDeletePolicy::Cascade)
            .unwrap();

        assert_eq!(accounts.get_by_id(account.id), Ok(None));
        assert_eq!(transactions.list_all(), Ok(vec![kept]));
    }
}
