//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState, endpoints,
    handlers::{
        archive_transaction_endpoint, create_account_endpoint, create_category_endpoint,
        create_transaction_endpoint, delete_account_endpoint, delete_category_endpoint,
        delete_transaction_endpoint, get_account_endpoint, get_category_endpoint,
        get_category_target_total_endpoint, get_transaction_endpoint,
        list_account_transactions_endpoint, list_accounts_endpoint, list_categories_endpoint,
        list_category_children_endpoint, list_transactions_endpoint,
        restore_transaction_endpoint, update_account_endpoint, update_category_endpoint,
        update_transaction_endpoint,
    },
    logging_middleware,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let account_routes = Router::new()
        .route(
            endpoints::ACCOUNTS,
            get(list_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNT,
            get(get_account_endpoint)
                .put(update_account_endpoint)
                .delete(delete_account_endpoint),
        )
        .route(
            endpoints::ACCOUNT_TRANSACTIONS,
            get(list_account_transactions_endpoint),
        );

    let category_routes = Router::new()
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(update_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(
            endpoints::CATEGORY_CHILDREN,
            get(list_category_children_endpoint),
        )
        .route(
            endpoints::CATEGORY_TARGET_TOTAL,
            get(get_category_target_total_endpoint),
        );

    let transaction_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::ARCHIVE_TRANSACTION,
            post(archive_transaction_endpoint),
        )
        .route(
            endpoints::RESTORE_TRANSACTION,
            post(restore_transaction_endpoint),
        );

    account_routes
        .merge(category_routes)
        .merge(transaction_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "no route matches the requested path" })),
    )
        .into_response()
}
