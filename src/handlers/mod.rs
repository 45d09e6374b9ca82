//! Route handlers for the JSON REST API.
//!
//! Handlers translate between HTTP and the [stores](crate::stores): request
//! bodies are deserialized into the domain [models](crate::models) and store
//! errors are turned into responses by [Error](crate::Error)'s `IntoResponse`.

mod account;
mod category;
mod transaction;

pub use account::{
    create_account_endpoint, delete_account_endpoint, get_account_endpoint,
    list_account_transactions_endpoint, list_accounts_endpoint, update_account_endpoint,
};
pub use category::{
    create_category_endpoint, delete_category_endpoint, get_category_endpoint,
    get_category_target_total_endpoint, list_categories_endpoint,
    list_category_children_endpoint, update_category_endpoint,
};
pub use transaction::{
    archive_transaction_endpoint, create_transaction_endpoint, delete_transaction_endpoint,
    get_transaction_endpoint, list_transactions_endpoint, restore_transaction_endpoint,
    update_transaction_endpoint,
};

use axum::{
    Json,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{database_id::DatabaseId, endpoints::format_endpoint};

/// The query string of a delete request, e.g. `?policy=cascade`.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery<P> {
    /// What to do with the rows that depend on the deleted row.
    #[serde(default)]
    pub policy: P,
}

/// Respond with `201 Created`, the location of the new resource and the resource itself.
fn created<T: Serialize>(endpoint: &str, id: DatabaseId, body: T) -> Response {
    (
        StatusCode::CREATED,
        [(LOCATION, format_endpoint(endpoint, id))],
        Json(body),
    )
        .into_response()
}

#[cfg(test)]
pub(crate) mod test_utils {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, build_router};

    /// Create a test server backed by a fresh in-memory database.
    #[track_caller]
    pub fn must_create_test_server() -> TestServer {
        let connection = Connection::open_in_memory().expect("Could not open database in memory.");
        let state = AppState::new(connection).expect("Could not create app state.");

        TestServer::new(build_router(state))
    }
}
