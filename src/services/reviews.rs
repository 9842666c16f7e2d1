use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use super::{advanced_results, list_query, Listing};
use crate::auth::{ensure_can_mutate, ensure_role};
use crate::database::models::review::average_rating;
use crate::database::models::{Review, ReviewDetail, ReviewInput, REVIEW_FIELDS};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::types::Role;

/// Roles allowed to write reviews
pub const REVIEWER_ROLES: &[Role] = &[Role::User, Role::Admin];

async fn fetch(state: &AppState, id: Uuid) -> Result<Review, ApiError> {
    state
        .reviews
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No review found with the id of {}", id)))
}

pub async fn list(state: &AppState, params: &HashMap<String, String>) -> Result<Listing, ApiError> {
    let query = list_query(state, params, REVIEW_FIELDS)?;
    let page = state.reviews.list(&query).await?;
    advanced_results(page, &query)
}

pub async fn list_for_bootcamp(state: &AppState, bootcamp: Uuid) -> Result<Vec<Review>, ApiError> {
    Ok(state.reviews.list_for_bootcamp(bootcamp).await?)
}

/// A review with its bootcamp's id, name and description embedded
pub async fn get(state: &AppState, id: Uuid) -> Result<ReviewDetail, ApiError> {
    let review = fetch(state, id).await?;
    let bootcamp = state.bootcamps.find_by_id(review.bootcamp).await?.map(|b| b.summary());
    Ok(ReviewDetail::new(review, bootcamp))
}

pub async fn create(state: &AppState, actor: &AuthUser, bootcamp: Uuid, input: ReviewInput) -> Result<Review, ApiError> {
    ensure_role(actor, REVIEWER_ROLES)?;

    if state.bootcamps.find_by_id(bootcamp).await?.is_none() {
        return Err(ApiError::not_found(format!("No bootcamp with the id of {}", bootcamp)));
    }

    let review = Review::new(bootcamp, actor.id, input);
    review.validate()?;

    let created = state.reviews.insert(&review).await?;
    refresh_average(state, bootcamp).await?;
    info!("User {} reviewed bootcamp {}", actor.id, bootcamp);
    Ok(created)
}

pub async fn update(state: &AppState, actor: &AuthUser, id: Uuid, input: ReviewInput) -> Result<Review, ApiError> {
    let mut review = fetch(state, id).await?;
    ensure_can_mutate(actor, review.user, "review")?;

    review.merge(input);
    review.validate()?;

    let updated = state.reviews.update(&review).await?;
    refresh_average(state, updated.bootcamp).await?;
    Ok(updated)
}

pub async fn delete(state: &AppState, actor: &AuthUser, id: Uuid) -> Result<(), ApiError> {
    let review = fetch(state, id).await?;
    ensure_can_mutate(actor, review.user, "review")?;

    state.reviews.delete(id).await?;
    refresh_average(state, review.bootcamp).await
}

async fn refresh_average(state: &AppState, bootcamp: Uuid) -> Result<(), ApiError> {
    let reviews = state.reviews.list_for_bootcamp(bootcamp).await?;
    state.bootcamps.set_average_rating(bootcamp, average_rating(&reviews)).await?;
    Ok(())
}
