//! This module defines the domain data types.
//!
//! Relationships between models are held as IDs. Collections such as an
//! account's transactions or a category's subcategories are queried from the
//! [stores](crate::stores) rather than stored on the model.

pub use account::{Account, AccountName, AccountType, NewAccount};
pub use category::{Category, CategoryName, NewCategory};
pub use transaction::{NewTransaction, Transaction};

mod account;
mod category;
mod transaction;
