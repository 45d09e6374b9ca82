//! Defines the account store trait.

use serde::Deserialize;

use crate::{
    Error,
    database_id::AccountId,
    models::{Account, NewAccount},
};

/// What to do with an account's transactions when the account is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountDeletePolicy {
    /// Refuse to delete an account that has transactions.
    #[default]
    Reject,
    /// Delete the account's transactions along with the account.
    Cascade,
}

/// Creates, retrieves, updates and deletes accounts.
pub trait AccountStore {
    /// Get every account in the order they were added.
    fn list_all(&self) -> Result<Vec<Account>, Error>;

    /// Get an account by its ID, `None` if there is no such account.
    fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, Error>;

    /// Add an account to the store and return it with its assigned ID.
    fn add(&self, account: NewAccount) -> Result<Account, Error>;

    /// Replace the name and type of an existing account.
    ///
    /// The balance is derived from the account's transactions and is ignored.
    fn update(&self, account: &Account) -> Result<(), Error>;

    /// Delete an account that has no transactions.
    ///
    /// Deleting an ID that does not exist succeeds without doing anything.
    fn delete(&self, id: AccountId) -> Result<(), Error> {
        self.delete_with_policy(id, AccountDeletePolicy::Reject)
    }

    /// Delete an account, applying `policy` to its transactions.
    fn delete_with_policy(&self, id: AccountId, policy: AccountDeletePolicy) -> Result<(), Error>;
}
