//! SQLite implementations of the [stores](crate::stores).
//!
//! All three stores share one connection. Each operation holds the
//! connection lock for its whole unit of work, and writes that touch more
//! than one row run inside a single SQL transaction.

mod account;
mod category;
mod transaction;

pub use account::SQLiteAccountStore;
pub use category::SQLiteCategoryStore;
pub use transaction::SQLiteTransactionStore;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

/// A database connection shared between stores and request handlers.
pub type SharedConnection = Arc<Mutex<Connection>>;

#[cfg(test)]
pub(crate) mod test_utils {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::db::initialize;

    use super::SharedConnection;

    #[track_caller]
    pub fn must_create_test_connection() -> SharedConnection {
        let connection =
            Connection::open_in_memory().expect("could not create in-memory SQLite database");
        initialize(&connection).expect("could not initialize test DB");

        Arc::new(Mutex::new(connection))
    }
}
