//! This file defines the `Account` type and the types needed to create an account.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::AccountId, money::Money};

/// A validated, non-empty account name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct AccountName(String);

impl AccountName {
    /// Create an account name.
    ///
    /// Leading and trailing whitespace is removed.
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

    /// Create an account name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for AccountName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AccountName::new(&value)
    }
}

impl From<AccountName> for String {
    fn from(value: AccountName) -> Self {
        value.0
    }
}

impl Display for AccountName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kinds of account that money can be held in or owed on.
///
/// The discriminants are stored in the database and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Long-term savings, typically earning interest.
    Savings = 0,
    /// Day-to-day spending and bill payments.
    Checking = 1,
    /// Borrowed money such as a credit card.
    Credit = 2,
    /// A loan such as a mortgage or personal loan.
    Loan = 3,
}

impl TryFrom<i64> for AccountType {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AccountType::Savings),
            1 => Ok(AccountType::Checking),
            2 => Ok(AccountType::Credit),
            3 => Ok(AccountType::Loan),
            other => Err(other),
        }
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(*self as i64))
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;

        AccountType::try_from(raw).map_err(FromSqlError::OutOfRange)
    }
}

/// A financial account, e.g. a checking account or a credit card.
///
/// The transactions of an account are not stored on the account, query them
/// with [TransactionStore::list_by_account](crate::stores::TransactionStore::list_by_account).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub id: AccountId,
    /// The display name of the account.
    pub name: AccountName,
    /// What kind of account this is.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// The opening balance plus the amounts of the account's active transactions.
    ///
    /// Maintained by the store whenever a transaction is added, changed,
    /// archived or deleted.
    pub balance: Money,
}

impl Account {
    /// Start describing a new account with a zero opening balance.
    ///
    /// Shortcut for [NewAccount] for discoverability.
    pub fn build(name: AccountName, account_type: AccountType) -> NewAccount {
        NewAccount {
            name,
            account_type,
            balance: Money::ZERO,
        }
    }
}

/// The data needed to add an account to a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    /// The display name of the account.
    pub name: AccountName,
    /// What kind of account this is.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// The opening balance, before any transactions.
    #[serde(default)]
    pub balance: Money,
}

impl NewAccount {
    /// Set the opening balance.
    pub fn balance(mut self, balance: Money) -> Self {
        self.balance = balance;
        self
    }
}

#[cfg(test)]
mod account_name_tests {
    use crate::{Error, models::AccountName};

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(AccountName::new(""), Err(Error::EmptyName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(AccountName::new("\n\t \r"), Err(Error::EmptyName));
    }

    #[test]
    fn new_trims_whitespace() {
        let name = AccountName::new("  Everyday ").unwrap();

        assert_eq!(name.as_ref(), "Everyday");
    }

    #[test]
    fn deserialize_rejects_empty_name() {
        let result = serde_json::from_str::<AccountName>("\" \"");

        assert!(result.is_err());
    }
}
