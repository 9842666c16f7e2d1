use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use super::{advanced_results, list_query, Listing};
use crate::auth::{ensure_can_mutate, ensure_role};
use crate::database::models::{Bootcamp, BootcampInput, Location, BOOTCAMP_FIELDS};
use crate::error::ApiError;
use crate::geo::angular_radius;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::types::Role;

/// Roles allowed to publish and manage bootcamps
pub const PUBLISHER_ROLES: &[Role] = &[Role::Publisher, Role::Admin];

pub(crate) fn not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("Bootcamp not found with id of {}", id))
}

/// Load a bootcamp or fail with 404
pub async fn fetch(state: &AppState, id: Uuid) -> Result<Bootcamp, ApiError> {
    state.bootcamps.find_by_id(id).await?.ok_or_else(|| not_found(id))
}

pub async fn list(state: &AppState, params: &HashMap<String, String>) -> Result<Listing, ApiError> {
    let query = list_query(state, params, BOOTCAMP_FIELDS)?;
    let page = state.bootcamps.list(&query).await?;
    advanced_results(page, &query)
}

pub async fn get(state: &AppState, id: Uuid) -> Result<Bootcamp, ApiError> {
    fetch(state, id).await
}

pub async fn create(state: &AppState, actor: &AuthUser, input: BootcampInput) -> Result<Bootcamp, ApiError> {
    ensure_role(actor, PUBLISHER_ROLES)?;

    // Only admins may publish more than one bootcamp
    if !actor.role.is_admin() && state.bootcamps.find_by_owner(actor.id).await?.is_some() {
        return Err(ApiError::bad_request(format!(
            "The user with ID {} has already published a bootcamp",
            actor.id
        )));
    }

    let address = input.address().map(str::to_string);
    let mut bootcamp = Bootcamp::new(actor.id, input);

    let mut errors = bootcamp.validation_errors();
    if address.is_none() {
        errors.add("address", "Please add an address");
    }
    errors.into_result()?;

    if let Some(address) = address {
        bootcamp.location = geocode_address(state, &address).await?;
    }

    let created = state.bootcamps.insert(&bootcamp).await?;
    info!("User {} published bootcamp {} ({})", actor.id, created.id, created.name);
    Ok(created)
}

pub async fn update(state: &AppState, actor: &AuthUser, id: Uuid, input: BootcampInput) -> Result<Bootcamp, ApiError> {
    ensure_role(actor, PUBLISHER_ROLES)?;

    let mut bootcamp = fetch(state, id).await?;
    ensure_can_mutate(actor, bootcamp.user, "bootcamp")?;

    let address = input.address().map(str::to_string);
    bootcamp.merge(input);
    bootcamp.validate()?;

    if let Some(address) = address {
        bootcamp.location = geocode_address(state, &address).await?;
    }

    Ok(state.bootcamps.update(&bootcamp).await?)
}

pub async fn delete(state: &AppState, actor: &AuthUser, id: Uuid) -> Result<(), ApiError> {
    ensure_role(actor, PUBLISHER_ROLES)?;

    let bootcamp = fetch(state, id).await?;
    ensure_can_mutate(actor, bootcamp.user, "bootcamp")?;

    // Reviews go with it through the foreign key cascade
    state.bootcamps.delete(id).await?;
    info!("Deleted bootcamp {}", id);
    Ok(())
}

/// Bootcamps within `distance` miles of the centre of `zipcode`
pub async fn within_radius(state: &AppState, zipcode: &str, distance: &str) -> Result<Vec<Bootcamp>, ApiError> {
    let distance: f64 = distance
        .parse()
        .ok()
        .filter(|d: &f64| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid distance '{}'", distance)))?;

    let center = state
        .geocoder
        .geocode(zipcode)
        .await?
        .first()
        .map(|m| m.point())
        .ok_or_else(|| ApiError::not_found(format!("No location found for zipcode {}", zipcode)))?;

    let radius = angular_radius(distance);
    tracing::debug!("Radius search around {:?}, {} mi ({} rad)", center, distance, radius);

    Ok(state.bootcamps.within_radius(center, radius).await?)
}

async fn geocode_address(state: &AppState, address: &str) -> Result<Location, ApiError> {
    let matches = state.geocoder.geocode(address).await?;
    matches
        .first()
        .map(Location::from)
        .ok_or_else(|| ApiError::bad_request(format!("Could not geocode address '{}'", address)))
}
