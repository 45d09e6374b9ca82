//! Defines the endpoints for managing budget categories.

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    AppState, Error,
    database_id::CategoryId,
    endpoints,
    models::{Category, NewCategory},
    money::Money,
    stores::{CategoryDeletePolicy, CategoryStore, sqlite::SQLiteCategoryStore},
};

use super::{DeleteQuery, created};

/// The state needed to manage categories.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The store for managing categories.
    pub category_store: SQLiteCategoryStore,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            category_store: state.category_store.clone(),
        }
    }
}

/// A route handler that lists every category.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
) -> Result<Json<Vec<Category>>, Error> {
    state.category_store.list_all().map(Json)
}

/// A route handler for creating a category, responds with the new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Json(new_category): Json<NewCategory>,
) -> Result<Response, Error> {
    let category = state.category_store.add(new_category)?;

    Ok(created(endpoints::CATEGORY, category.id, category))
}

/// A route handler for getting a single category.
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Category>, Error> {
    state
        .category_store
        .get_by_id(category_id)?
        .map(Json)
        .ok_or(Error::NotFound)
}

/// A route handler for replacing the name, parent and target of a category.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
    Json(form): Json<NewCategory>,
) -> Result<StatusCode, Error> {
    state.category_store.update(&Category {
        id: category_id,
        name: form.name,
        parent_id: form.parent_id,
        target_amount: form.target_amount,
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for deleting a category.
///
/// Deleting a category that does not exist is not an error.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
    Query(query): Query<DeleteQuery<CategoryDeletePolicy>>,
) -> Result<StatusCode, Error> {
    state
        .category_store
        .delete_with_policy(category_id, query.policy)?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler that lists the direct subcategories of a category.
pub async fn list_category_children_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Vec<Category>>, Error> {
    if state.category_store.get_by_id(category_id)?.is_none() {
        return Err(Error::NotFound);
    }

    state.category_store.list_children(category_id).map(Json)
}

/// A route handler for the target amount of a category plus all of its descendants.
pub async fn get_category_target_total_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Money>, Error> {
    state
        .category_store
        .target_total(category_id)?
        .map(Json)
        .ok_or(Error::NotFound)
}
