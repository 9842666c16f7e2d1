use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use super::{advanced_results, list_query, Listing};
use crate::auth::password::hash_password;
use crate::database::models::{User, UserInput, USER_FIELDS};
use crate::error::ApiError;
use crate::state::AppState;

// Admin-only; the route layer enforces the role.

async fn fetch(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User not found with id of {}", id)))
}

pub async fn list(state: &AppState, params: &HashMap<String, String>) -> Result<Listing, ApiError> {
    let query = list_query(state, params, USER_FIELDS)?;
    let page = state.users.list(&query).await?;
    advanced_results(page, &query)
}

pub async fn get(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    fetch(state, id).await
}

pub async fn create(state: &AppState, input: UserInput) -> Result<User, ApiError> {
    let mut user = User::new(&input);

    let mut errors = user.validation_errors();
    input.password_errors(true, &mut errors);
    errors.into_result()?;

    if let Some(password) = input.password.as_deref() {
        user.password_hash = hash_password(password)?;
    }

    let created = state.users.insert(&user).await?;
    info!("Created user {} with role {}", created.id, created.role);
    Ok(created)
}

pub async fn update(state: &AppState, id: Uuid, input: UserInput) -> Result<User, ApiError> {
    let mut user = fetch(state, id).await?;
    user.merge(&input);

    let mut errors = user.validation_errors();
    input.password_errors(false, &mut errors);
    errors.into_result()?;

    if let Some(password) = input.password.as_deref() {
        user.password_hash = hash_password(password)?;
    }

    Ok(state.users.update(&user).await?)
}

pub async fn delete(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    fetch(state, id).await?;
    state.users.delete(id).await?;
    info!("Deleted user {}", id);
    Ok(())
}
