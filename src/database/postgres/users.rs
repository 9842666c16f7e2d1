use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::PgDatabase;
use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::database::query_builder::QueryBuilder;
use crate::database::repository::UserRepository;
use crate::filter::{ListQuery, Page};
use crate::types::Role;

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(DatabaseError::QueryError)?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PgDatabase {
    async fn list(&self, query: &ListQuery) -> Result<Page<User>, DatabaseError> {
        let (rows, total) = QueryBuilder::new("users", query).fetch_page::<UserRow>(&self.pool).await?;
        let items = rows.into_iter().map(User::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Page { items, total })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn insert(&self, user: &User) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, name, email, role, password_hash, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?;
        User::try_from(row)
    }

    async fn update(&self, user: &User) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET name = $2, email = $3, role = $4, password_hash = $5 WHERE id = $1 RETURNING *",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user.id)))?;
        User::try_from(row)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }
}
