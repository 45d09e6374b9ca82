//! Defines the transaction store trait.

use crate::{
    Error,
    database_id::{AccountId, TransactionId},
    models::{NewTransaction, Transaction},
};

/// Handles transactions and keeps account balances in step with them.
///
/// Every write changes the transaction rows and the affected account
/// balances together or not at all.
pub trait TransactionStore {
    /// Get every transaction, archived or not, in the order they were added.
    fn list_all(&self) -> Result<Vec<Transaction>, Error>;

    /// Get a transaction by its ID, `None` if there is no such transaction.
    fn get_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, Error>;

    /// Add a transaction and apply its amount to its account's balance.
    fn add(&self, transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Replace the fields of an existing transaction.
    ///
    /// The old amount is taken off the old account and the new amount is
    /// applied to the new account. Whether the transaction is archived is
    /// not changed, use [TransactionStore::archive] and
    /// [TransactionStore::restore] for that.
    fn update(&self, transaction: &Transaction) -> Result<(), Error>;

    /// Delete a transaction and take its amount off its account's balance.
    ///
    /// Deleting an ID that does not exist succeeds without doing anything.
    fn delete(&self, id: TransactionId) -> Result<(), Error>;

    /// Get the transactions of one account in the order they were added.
    fn list_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, Error>;

    /// Keep a transaction for history but take it out of its account's balance.
    ///
    /// Archiving an archived transaction does nothing.
    fn archive(&self, id: TransactionId) -> Result<Transaction, Error>;

    /// Undo [TransactionStore::archive].
    ///
    /// Restoring a transaction that is not archived does nothing.
    fn restore(&self, id: TransactionId) -> Result<Transaction, Error>;
}
