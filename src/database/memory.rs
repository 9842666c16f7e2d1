//! In-process store used by `serve --memory` and the test suite. Enforces the
//! same uniqueness rules as the Postgres schema.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Bootcamp, Review, User};
use crate::database::repository::{BootcampRepository, ReviewRepository, UserRepository};
use crate::filter::filter::apply_in_memory;
use crate::filter::{ListQuery, Page};
use crate::geo::GeoPoint;

#[derive(Default)]
pub struct MemoryDatabase {
    bootcamps: RwLock<Vec<Bootcamp>>,
    reviews: RwLock<Vec<Review>>,
    users: RwLock<Vec<User>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(kind: &str, id: Uuid) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {}", kind, id))
}

#[async_trait]
impl BootcampRepository for MemoryDatabase {
    async fn list(&self, query: &ListQuery) -> Result<Page<Bootcamp>, DatabaseError> {
        let records = self.bootcamps.read().await.clone();
        Ok(apply_in_memory(records, query))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bootcamp>, DatabaseError> {
        Ok(self.bootcamps.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<Bootcamp>, DatabaseError> {
        Ok(self.bootcamps.read().await.iter().find(|b| b.user == owner).cloned())
    }

    async fn within_radius(&self, center: GeoPoint, radius: f64) -> Result<Vec<Bootcamp>, DatabaseError> {
        Ok(self
            .bootcamps
            .read()
            .await
            .iter()
            .filter(|b| center.within_cap(&b.location.point(), radius))
            .cloned()
            .collect())
    }

    async fn insert(&self, bootcamp: &Bootcamp) -> Result<Bootcamp, DatabaseError> {
        let mut bootcamps = self.bootcamps.write().await;
        if bootcamps.iter().any(|b| b.name == bootcamp.name) {
            return Err(DatabaseError::Duplicate("bootcamps_name_key".to_string()));
        }
        bootcamps.push(bootcamp.clone());
        Ok(bootcamp.clone())
    }

    async fn update(&self, bootcamp: &Bootcamp) -> Result<Bootcamp, DatabaseError> {
        let mut bootcamps = self.bootcamps.write().await;
        if bootcamps.iter().any(|b| b.id != bootcamp.id && b.name == bootcamp.name) {
            return Err(DatabaseError::Duplicate("bootcamps_name_key".to_string()));
        }
        let existing = bootcamps
            .iter_mut()
            .find(|b| b.id == bootcamp.id)
            .ok_or_else(|| not_found("bootcamp", bootcamp.id))?;

        // Photo and rating have their own writers
        let photo = std::mem::take(&mut existing.photo);
        let rating = existing.average_rating;
        *existing = Bootcamp { photo, average_rating: rating, ..bootcamp.clone() };
        Ok(existing.clone())
    }

    async fn set_photo(&self, id: Uuid, photo: &str) -> Result<(), DatabaseError> {
        let mut bootcamps = self.bootcamps.write().await;
        let bootcamp = bootcamps.iter_mut().find(|b| b.id == id).ok_or_else(|| not_found("bootcamp", id))?;
        bootcamp.photo = photo.to_string();
        Ok(())
    }

    async fn set_average_rating(&self, id: Uuid, rating: Option<f64>) -> Result<(), DatabaseError> {
        if let Some(bootcamp) = self.bootcamps.write().await.iter_mut().find(|b| b.id == id) {
            bootcamp.average_rating = rating;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut bootcamps = self.bootcamps.write().await;
        let before = bootcamps.len();
        bootcamps.retain(|b| b.id != id);
        if bootcamps.len() == before {
            return Err(not_found("bootcamp", id));
        }
        drop(bootcamps);

        // Mirrors ON DELETE CASCADE
        self.reviews.write().await.retain(|r| r.bootcamp != id);
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for MemoryDatabase {
    async fn list(&self, query: &ListQuery) -> Result<Page<Review>, DatabaseError> {
        let records = self.reviews.read().await.clone();
        Ok(apply_in_memory(records, query))
    }

    async fn list_for_bootcamp(&self, bootcamp: Uuid) -> Result<Vec<Review>, DatabaseError> {
        Ok(self.reviews.read().await.iter().filter(|r| r.bootcamp == bootcamp).cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, DatabaseError> {
        Ok(self.reviews.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, review: &Review) -> Result<Review, DatabaseError> {
        if !self.bootcamps.read().await.iter().any(|b| b.id == review.bootcamp) {
            return Err(DatabaseError::QueryError(format!(
                "reviews_bootcamp_id_fkey: bootcamp {} does not exist",
                review.bootcamp
            )));
        }
        let mut reviews = self.reviews.write().await;
        if reviews.iter().any(|r| r.bootcamp == review.bootcamp && r.user == review.user) {
            return Err(DatabaseError::Duplicate("reviews_bootcamp_id_user_id_key".to_string()));
        }
        reviews.push(review.clone());
        Ok(review.clone())
    }

    async fn update(&self, review: &Review) -> Result<Review, DatabaseError> {
        let mut reviews = self.reviews.write().await;
        let existing = reviews.iter_mut().find(|r| r.id == review.id).ok_or_else(|| not_found("review", review.id))?;
        existing.title = review.title.clone();
        existing.text = review.text.clone();
        existing.rating = review.rating;
        Ok(existing.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut reviews = self.reviews.write().await;
        let before = reviews.len();
        reviews.retain(|r| r.id != id);
        if reviews.len() == before {
            return Err(not_found("review", id));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryDatabase {
    async fn list(&self, query: &ListQuery) -> Result<Page<User>, DatabaseError> {
        let records = self.users.read().await.clone();
        Ok(apply_in_memory(records, query))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: &User) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::Duplicate("users_email_key".to_string()));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.id != user.id && u.email == user.email) {
            return Err(DatabaseError::Duplicate("users_email_key".to_string()));
        }
        let existing = users.iter_mut().find(|u| u.id == user.id).ok_or_else(|| not_found("user", user.id))?;
        *existing = User { created_at: existing.created_at, ..user.clone() };
        Ok(existing.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(not_found("user", id));
        }
        Ok(())
    }
}
