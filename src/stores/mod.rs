//! Contains traits and implementations for objects that store the domain [models](crate::models).

mod account;
mod category;
mod transaction;

pub mod sqlite;

pub use account::{AccountDeletePolicy, AccountStore};
pub use category::{CategoryDeletePolicy, CategoryStore};
pub use transaction::TransactionStore;
