use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::PgDatabase;
use crate::database::manager::DatabaseError;
use crate::database::models::Review;
use crate::database::query_builder::QueryBuilder;
use crate::database::repository::ReviewRepository;
use crate::filter::{ListQuery, Page};

#[derive(Debug, FromRow)]
struct ReviewRow {
    id: Uuid,
    title: String,
    text: String,
    rating: i32,
    bootcamp_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            title: row.title,
            text: row.text,
            rating: row.rating,
            bootcamp: row.bootcamp_id,
            user: row.user_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ReviewRepository for PgDatabase {
    async fn list(&self, query: &ListQuery) -> Result<Page<Review>, DatabaseError> {
        let (rows, total) = QueryBuilder::new("reviews", query).fetch_page::<ReviewRow>(&self.pool).await?;
        Ok(Page { items: rows.into_iter().map(Review::from).collect(), total })
    }

    async fn list_for_bootcamp(&self, bootcamp: Uuid) -> Result<Vec<Review>, DatabaseError> {
        let rows = sqlx::query_as::<_, ReviewRow>("SELECT * FROM reviews WHERE bootcamp_id = $1 ORDER BY created_at")
            .bind(bootcamp)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, DatabaseError> {
        let row = sqlx::query_as::<_, ReviewRow>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Review::from))
    }

    async fn insert(&self, review: &Review) -> Result<Review, DatabaseError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "INSERT INTO reviews (id, title, text, rating, bootcamp_id, user_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(review.id)
        .bind(&review.title)
        .bind(&review.text)
        .bind(review.rating)
        .bind(review.bootcamp)
        .bind(review.user)
        .bind(review.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update(&self, review: &Review) -> Result<Review, DatabaseError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "UPDATE reviews SET title = $2, text = $3, rating = $4 WHERE id = $1 RETURNING *",
        )
        .bind(review.id)
        .bind(&review.title)
        .bind(&review.text)
        .bind(review.rating)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("review {}", review.id)))?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1").bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("review {}", id)));
        }
        Ok(())
    }
}
