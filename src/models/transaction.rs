//! This file defines the `Transaction` type and the types needed to create a transaction.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    database_id::{AccountId, CategoryId, TransactionId},
    money::Money,
};

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// When the transaction happened.
    pub date: Date,
    /// The amount of money spent or earned in this transaction.
    ///
    /// Positive values represent income/credits, negative values represent
    /// expenses/debits.
    pub amount: Money,
    /// A text description of what the transaction was for, may be empty.
    pub description: String,
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The budget category the transaction counts towards.
    pub category_id: CategoryId,
    /// Whether the transaction has been archived.
    ///
    /// Archived transactions are kept for history but do not count towards
    /// their account's balance.
    pub archived: bool,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(
        amount: Money,
        date: Date,
        description: &str,
        account_id: AccountId,
        category_id: CategoryId,
    ) -> NewTransaction {
        NewTransaction {
            amount,
            date,
            description: description.to_owned(),
            account_id,
            category_id,
        }
    }
}

/// The data needed to add a transaction to a store.
///
/// The same fields are replaced when a transaction is updated.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The monetary amount of the transaction.
    ///
    /// # Examples
    /// - `150.00` - Salary deposit
    /// - `-45.99` - Coffee shop purchase
    pub amount: Money,

    /// The date when the transaction occurred.
    pub date: Date,

    /// A human-readable description of the transaction.
    #[serde(default)]
    pub description: String,

    /// The account the transaction belongs to.
    pub account_id: AccountId,

    /// The category the transaction counts towards.
    pub category_id: CategoryId,
}

impl NewTransaction {
    /// Combine the fields with an existing transaction's ID.
    ///
    /// The returned transaction is not archived.
    pub fn with_id(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            date: self.date,
            amount: self.amount,
            description: self.description,
            account_id: self.account_id,
            category_id: self.category_id,
            archived: false,
        }
    }
}
