//! Defines the endpoints for managing accounts.

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    database_id::AccountId,
    endpoints,
    models::{Account, AccountName, AccountType, NewAccount, Transaction},
    stores::{
        AccountDeletePolicy, AccountStore, TransactionStore,
        sqlite::{SQLiteAccountStore, SQLiteTransactionStore},
    },
};

use super::{DeleteQuery, created};

/// The state needed to manage accounts.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The store for managing accounts.
    pub account_store: SQLiteAccountStore,
    /// The store for listing an account's transactions.
    pub transaction_store: SQLiteTransactionStore,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            account_store: state.account_store.clone(),
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// The fields of an account that can be edited.
///
/// The balance is left out since it is derived from the account's transactions.
#[derive(Debug, Deserialize)]
pub struct EditAccountForm {
    name: AccountName,
    #[serde(rename = "type")]
    account_type: AccountType,
}

/// A route handler that lists every account.
pub async fn list_accounts_endpoint(
    State(state): State<AccountState>,
) -> Result<Json<Vec<Account>>, Error> {
    state.account_store.list_all().map(Json)
}

/// A route handler for creating an account, responds with the new account.
pub async fn create_account_endpoint(
    State(state): State<AccountState>,
    Json(new_account): Json<NewAccount>,
) -> Result<Response, Error> {
    let account = state.account_store.add(new_account)?;

    Ok(created(endpoints::ACCOUNT, account.id, account))
}

/// A route handler for getting a single account.
pub async fn get_account_endpoint(
    State(state): State<AccountState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Account>, Error> {
    state
        .account_store
        .get_by_id(account_id)?
        .map(Json)
        .ok_or(Error::NotFound)
}

/// A route handler for renaming an account or changing its type.
pub async fn update_account_endpoint(
    State(state): State<AccountState>,
    Path(account_id): Path<AccountId>,
    Json(form): Json<EditAccountForm>,
) -> Result<StatusCode, Error> {
    let account = state
        .account_store
        .get_by_id(account_id)?
        .ok_or(Error::NotFound)?;

    state.account_store.update(&Account {
        name: form.name,
        account_type: form.account_type,
        ..account
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for deleting an account.
///
/// Deleting an account that does not exist is not an error.
pub async fn delete_account_endpoint(
    State(state): State<AccountState>,
    Path(account_id): Path<AccountId>,
    Query(query): Query<DeleteQuery<AccountDeletePolicy>>,
) -> Result<StatusCode, Error> {
    state
        .account_store
        .delete_with_policy(account_id, query.policy)?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler that lists the transactions of an account.
pub async fn list_account_transactions_endpoint(
    State(state): State<AccountState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Vec<Transaction>>, Error> {
    if state.account_store.get_by_id(account_id)?.is_none() {
        return Err(Error::NotFound);
    }

    state.transaction_store.list_by_account(account_id).map(Json)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        handlers::test_utils::must_create_test_server,
        models::{Account, AccountType, Category, Transaction},
    };

    #[tokio::test]
    async fn create_account_responds_with_account() {
        let server = must_create_test_server();

        let response = server
            .post(endpoints::ACCOUNTS)
            .json(&json!({ "name": "Everyday", "type": "Checking", "balance": "12.5" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let account = response.json::<Account>();
        assert_eq!(account.name.as_ref(), "Everyday");
        assert_eq!(account.account_type, AccountType::Checking);
        assert_eq!(account.balance.to_string(), "12.50");
        assert_eq!(
            response.header("location"),
            format_endpoint(endpoints::ACCOUNT, account.id)
        );

        let fetched = server
            .get(&format_endpoint(endpoints::ACCOUNT, account.id))
            .await
            .json::<Account>();
        assert_eq!(fetched, account);
    }

    #[tokio::test]
    async fn create_account_with_empty_name_fails() {
        let server = must_create_test_server();

        server
            .post(endpoints::ACCOUNTS)
            .json(&json!({ "name": "  ", "type": "Savings" }))
            .expect_failure()
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let accounts = server.get(endpoints::ACCOUNTS).await.json::<Vec<Account>>();
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn get_missing_account_responds_not_found() {
        let server = must_create_test_server();

        server
            .get(&format_endpoint(endpoints::ACCOUNT, 999))
            .expect_failure()
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn update_account_changes_name_and_type() {
        let server = must_create_test_server();
        let account = server
            .post(endpoints::ACCOUNTS)
            .json(&json!({ "name": "Card", "type": "Checking", "balance": 10 }))
            .await
            .json::<Account>();
        let path = format_endpoint(endpoints::ACCOUNT, account.id);

        server
            .put(&path)
            .json(&json!({ "name": "Visa", "type": "Credit" }))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let updated = server.get(&path).await.json::<Account>();
        assert_eq!(updated.name.as_ref(), "Visa");
        assert_eq!(updated.account_type, AccountType::Credit);
        assert_eq!(updated.balance, account.balance);
    }

    #[tokio::test]
    async fn delete_account_with_transactions_needs_cascade() {
        let server = must_create_test_server();
        let account = server
            .post(endpoints::ACCOUNTS)
            .json(&json!({ "name": "Main", "type": "Checking" }))
            .await
            .json::<Account>();
        let category = server
            .post(endpoints::CATEGORIES)
            .json(&json!({ "name": "Food" }))
            .await
            .json::<Category>();
        server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": "-42.50",
                "date": "2024-03-01",
                "account_id": account.id,
                "category_id": category.id,
            }))
            .await
            .assert_status(StatusCode::CREATED);
        let path = format_endpoint(endpoints::ACCOUNT, account.id);

        server
            .delete(&path)
            .expect_failure()
            .await
            .assert_status_bad_request();

        server
            .delete(&path)
            .add_query_param("policy", "cascade")
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server.get(&path).expect_failure().await.assert_status_not_found();
        let transactions = server
            .get(endpoints::TRANSACTIONS)
            .await
            .json::<Vec<Transaction>>();
        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_account_succeeds() {
        let server = must_create_test_server();

        server
            .delete(&format_endpoint(endpoints::ACCOUNT, 999))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn list_account_transactions_for_missing_account_responds_not_found() {
        let server = must_create_test_server();

        server
            .get(&format_endpoint(endpoints::ACCOUNT_TRANSACTIONS, 1))
            .expect_failure()
            .await
            .assert_status_not_found();
    }
}
