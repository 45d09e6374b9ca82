//! Defines the endpoints for managing transactions.

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    AppState, Error,
    database_id::TransactionId,
    endpoints,
    models::{NewTransaction, Transaction},
    stores::{TransactionStore, sqlite::SQLiteTransactionStore},
};

use super::created;

/// The state needed to manage transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The store for managing transactions.
    pub transaction_store: SQLiteTransactionStore,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// A route handler that lists every transaction, archived ones included.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    state.transaction_store.list_all().map(Json)
}

/// A route handler for creating a new transaction, responds with the new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<Response, Error> {
    let transaction = state.transaction_store.add(new_transaction)?;

    Ok(created(endpoints::TRANSACTION, transaction.id, transaction))
}

/// A route handler for getting a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    state
        .transaction_store
        .get_by_id(transaction_id)?
        .map(Json)
        .ok_or(Error::NotFound)
}

/// A route handler for replacing the fields of a transaction.
///
/// Whether the transaction is archived does not change, use the archive and
/// restore endpoints for that.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Json(form): Json<NewTransaction>,
) -> Result<StatusCode, Error> {
    state
        .transaction_store
        .update(&form.with_id(transaction_id))?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for deleting a transaction.
///
/// Deleting a transaction that does not exist is not an error.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    state.transaction_store.delete(transaction_id)?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for archiving a transaction, responds with the archived transaction.
pub async fn archive_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    state.transaction_store.archive(transaction_id).map(Json)
}

/// A route handler for restoring an archived transaction, responds with the restored transaction.
pub async fn restore_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    state.transaction_store.restore(transaction_id).map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        database_id::{AccountId, CategoryId},
        endpoints::{self, format_endpoint},
        handlers::test_utils::must_create_test_server,
        models::{Account, Category, Transaction},
    };

    async fn create_account_and_category(server: &TestServer) -> (AccountId, CategoryId) {
        let account = server
            .post(endpoints::ACCOUNTS)
            .json(&json!({ "name": "Everyday", "type": "Checking" }))
            .await
            .json::<Account>();
        let category = server
            .post(endpoints::CATEGORIES)
            .json(&json!({ "name": "Food" }))
            .await
            .json::<Category>();

        (account.id, category.id)
    }

    async fn get_balance(server: &TestServer, account_id: AccountId) -> String {
        server
            .get(&format_endpoint(endpoints::ACCOUNT, account_id))
            .await
            .json::<Account>()
            .balance
            .to_string()
    }

    #[tokio::test]
    async fn create_transaction_updates_balance() {
        let server = must_create_test_server();
        let (account_id, category_id) = create_account_and_category(&server).await;

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": -42.5,
                "date": "2024-03-01",
                "description": "Groceries",
                "account_id": account_id,
                "category_id": category_id,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction = response.json::<Transaction>();
        assert_eq!(transaction.amount.to_string(), "-42.50");
        assert!(!transaction.archived);
        assert_eq!(get_balance(&server, account_id).await, "-42.50");

        let listed = server
            .get(&format_endpoint(endpoints::ACCOUNT_TRANSACTIONS, account_id))
            .await
            .json::<Vec<Transaction>>();
        assert_eq!(listed, vec![transaction]);
    }

    #[tokio::test]
    async fn create_transaction_with_invalid_account_fails() {
        let server = must_create_test_server();
        let (_, category_id) = create_account_and_category(&server).await;

        server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": "1.00",
                "date": "2024-03-01",
                "account_id": 999,
                "category_id": category_id,
            }))
            .expect_failure()
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn update_transaction_replaces_amount() {
        let server = must_create_test_server();
        let (account_id, category_id) = create_account_and_category(&server).await;
        let body = json!({
            "amount": "100.00",
            "date": "2024-03-01",
            "account_id": account_id,
            "category_id": category_id,
        });
        let first = server
            .post(endpoints::TRANSACTIONS)
            .json(&body)
            .await
            .json::<Transaction>();
        server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": "-30.00",
                "date": "2024-03-02",
                "account_id": account_id,
                "category_id": category_id,
            }))
            .await;

        server
            .put(&format_endpoint(endpoints::TRANSACTION, first.id))
            .json(&json!({
                "amount": "50.00",
                "date": "2024-03-01",
                "account_id": account_id,
                "category_id": category_id,
            }))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        assert_eq!(get_balance(&server, account_id).await, "20.00");
    }

    #[tokio::test]
    async fn update_missing_transaction_responds_not_found() {
        let server = must_create_test_server();
        let (account_id, category_id) = create_account_and_category(&server).await;

        server
            .put(&format_endpoint(endpoints::TRANSACTION, 999))
            .json(&json!({
                "amount": "1",
                "date": "2024-03-01",
                "account_id": account_id,
                "category_id": category_id,
            }))
            .expect_failure()
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn archive_and_restore_transaction() {
        let server = must_create_test_server();
        let (account_id, category_id) = create_account_and_category(&server).await;
        let transaction = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": "-10",
                "date": "2024-03-01",
                "account_id": account_id,
                "category_id": category_id,
            }))
            .await
            .json::<Transaction>();

        let archived = server
            .post(&format_endpoint(endpoints::ARCHIVE_TRANSACTION, transaction.id))
            .await
            .json::<Transaction>();
        assert!(archived.archived);
        assert_eq!(get_balance(&server, account_id).await, "0.00");

        let restored = server
            .post(&format_endpoint(endpoints::RESTORE_TRANSACTION, transaction.id))
            .await
            .json::<Transaction>();
        assert!(!restored.archived);
        assert_eq!(get_balance(&server, account_id).await, "-10.00");
    }

    #[tokio::test]
    async fn delete_transaction_twice_succeeds() {
        let server = must_create_test_server();
        let (account_id, category_id) = create_account_and_category(&server).await;
        let transaction = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": "5",
                "date": "2024-03-01",
                "account_id": account_id,
                "category_id": category_id,
            }))
            .await
            .json::<Transaction>();
        let path = format_endpoint(endpoints::TRANSACTION, transaction.id);

        server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
        server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);

        server.get(&path).expect_failure().await.assert_status_not_found();
        assert_eq!(get_balance(&server, account_id).await, "0.00");
    }
}
