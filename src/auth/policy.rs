//! Owner-or-admin mutation policy shared by every resource.
//!
//! Checks are pure: they never touch storage, so callers load the record,
//! decide here, and only then write.

use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::types::Role;

/// True iff the actor is an admin or owns the resource.
pub fn can_mutate(actor: &AuthUser, resource_owner_id: Uuid) -> bool {
    actor.role.is_admin() || actor.id == resource_owner_id
}

/// Fails with Unauthorized when `can_mutate` denies.
pub fn ensure_can_mutate(actor: &AuthUser, resource_owner_id: Uuid, resource: &str) -> Result<(), ApiError> {
    if can_mutate(actor, resource_owner_id) {
        Ok(())
    } else {
        tracing::warn!("User {} denied mutation of {} owned by {}", actor.id, resource, resource_owner_id);
        Err(ApiError::unauthorized(format!(
            "User {} is not authorized to modify this {}",
            actor.id, resource
        )))
    }
}

/// Route-level role gate. Fails with Forbidden.
pub fn ensure_role(actor: &AuthUser, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "User role {} is not authorized to access this route",
            actor.role
        )))
    }
}
