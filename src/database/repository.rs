//! Storage seams used by the services. Implemented for Postgres and for an
//! in-memory store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Bootcamp, Review, User};
use crate::filter::{ListQuery, Page};
use crate::geo::GeoPoint;

#[async_trait]
pub trait BootcampRepository: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Page<Bootcamp>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bootcamp>, DatabaseError>;

    /// Any bootcamp owned by `owner`
    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<Bootcamp>, DatabaseError>;

    /// Bootcamps whose location lies within `radius` radians of `center`
    async fn within_radius(&self, center: GeoPoint, radius: f64) -> Result<Vec<Bootcamp>, DatabaseError>;

    async fn insert(&self, bootcamp: &Bootcamp) -> Result<Bootcamp, DatabaseError>;

    /// Persist every field of an already validated record
    async fn update(&self, bootcamp: &Bootcamp) -> Result<Bootcamp, DatabaseError>;

    async fn set_photo(&self, id: Uuid, photo: &str) -> Result<(), DatabaseError>;

    /// No-op when the bootcamp is gone
    async fn set_average_rating(&self, id: Uuid, rating: Option<f64>) -> Result<(), DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Page<Review>, DatabaseError>;

    async fn list_for_bootcamp(&self, bootcamp: Uuid) -> Result<Vec<Review>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, DatabaseError>;

    async fn insert(&self, review: &Review) -> Result<Review, DatabaseError>;

    async fn update(&self, review: &Review) -> Result<Review, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Page<User>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn insert(&self, user: &User) -> Result<User, DatabaseError>;

    async fn update(&self, user: &User) -> Result<User, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;
}
