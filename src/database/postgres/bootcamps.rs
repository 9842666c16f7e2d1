use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::PgDatabase;
use crate::database::manager::DatabaseError;
use crate::database::models::{Bootcamp, Career, Location};
use crate::database::query_builder::QueryBuilder;
use crate::database::repository::BootcampRepository;
use crate::filter::{ListQuery, Page};
use crate::geo::GeoPoint;

const TABLE: &str = "bootcamps";

#[derive(Debug, FromRow)]
struct BootcampRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    slug: String,
    description: String,
    website: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    longitude: f64,
    latitude: f64,
    formatted_address: Option<String>,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zipcode: Option<String>,
    country: Option<String>,
    careers: Vec<String>,
    average_rating: Option<f64>,
    average_cost: Option<i32>,
    photo: String,
    housing: bool,
    job_assistance: bool,
    job_guarantee: bool,
    accept_gi: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<BootcampRow> for Bootcamp {
    type Error = DatabaseError;

    fn try_from(row: BootcampRow) -> Result<Self, Self::Error> {
        let careers = row
            .careers
            .iter()
            .map(|c| c.parse::<Career>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::QueryError)?;

        Ok(Bootcamp {
            id: row.id,
            user: row.user_id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            website: row.website,
            phone: row.phone,
            email: row.email,
            location: Location {
                kind: "Point".to_string(),
                coordinates: [row.longitude, row.latitude],
                formatted_address: row.formatted_address,
                street: row.street,
                city: row.city,
                state: row.state,
                zipcode: row.zipcode,
                country: row.country,
            },
            careers,
            average_rating: row.average_rating,
            average_cost: row.average_cost,
            photo: row.photo,
            housing: row.housing,
            job_assistance: row.job_assistance,
            job_guarantee: row.job_guarantee,
            accept_gi: row.accept_gi,
            created_at: row.created_at,
        })
    }
}

fn into_bootcamps(rows: Vec<BootcampRow>) -> Result<Vec<Bootcamp>, DatabaseError> {
    rows.into_iter().map(Bootcamp::try_from).collect()
}

fn career_names(bootcamp: &Bootcamp) -> Vec<String> {
    bootcamp.careers.iter().map(|c| c.as_str().to_string()).collect()
}

#[async_trait]
impl BootcampRepository for PgDatabase {
    async fn list(&self, query: &ListQuery) -> Result<Page<Bootcamp>, DatabaseError> {
        let (rows, total) = QueryBuilder::new(TABLE, query).fetch_page::<BootcampRow>(&self.pool).await?;
        Ok(Page { items: into_bootcamps(rows)?, total })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bootcamp>, DatabaseError> {
        sqlx::query_as::<_, BootcampRow>("SELECT * FROM bootcamps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Bootcamp::try_from)
            .transpose()
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<Bootcamp>, DatabaseError> {
        sqlx::query_as::<_, BootcampRow>("SELECT * FROM bootcamps WHERE user_id = $1 ORDER BY created_at LIMIT 1")
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .map(Bootcamp::try_from)
            .transpose()
    }

    async fn within_radius(&self, center: GeoPoint, radius: f64) -> Result<Vec<Bootcamp>, DatabaseError> {
        // Haversine central angle, matching GeoPoint::central_angle
        let rows = sqlx::query_as::<_, BootcampRow>(
            r#"
            SELECT * FROM bootcamps
            WHERE 2 * asin(LEAST(1.0, sqrt(
                power(sin(radians(latitude - $1) / 2), 2)
                + cos(radians($1)) * cos(radians(latitude)) * power(sin(radians(longitude - $2) / 2), 2)
            ))) <= $3
            ORDER BY created_at
            "#,
        )
        .bind(center.latitude)
        .bind(center.longitude)
        .bind(radius)
        .fetch_all(&self.pool)
        .await?;

        into_bootcamps(rows)
    }

    async fn insert(&self, bootcamp: &Bootcamp) -> Result<Bootcamp, DatabaseError> {
        let row = sqlx::query_as::<_, BootcampRow>(
            r#"
            INSERT INTO bootcamps (
                id, user_id, name, slug, description, website, phone, email,
                longitude, latitude, formatted_address, street, city, state, zipcode, country,
                careers, average_rating, average_cost, photo,
                housing, job_assistance, job_guarantee, accept_gi, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $25)
            RETURNING *
            "#,
        )
        .bind(bootcamp.id)
        .bind(bootcamp.user)
        .bind(&bootcamp.name)
        .bind(&bootcamp.slug)
        .bind(&bootcamp.description)
        .bind(&bootcamp.website)
        .bind(&bootcamp.phone)
        .bind(&bootcamp.email)
        .bind(bootcamp.location.coordinates[0])
        .bind(bootcamp.location.coordinates[1])
        .bind(&bootcamp.location.formatted_address)
        .bind(&bootcamp.location.street)
        .bind(&bootcamp.location.city)
        .bind(&bootcamp.location.state)
        .bind(&bootcamp.location.zipcode)
        .bind(&bootcamp.location.country)
        .bind(career_names(bootcamp))
        .bind(bootcamp.average_rating)
        .bind(bootcamp.average_cost)
        .bind(&bootcamp.photo)
        .bind(bootcamp.housing)
        .bind(bootcamp.job_assistance)
        .bind(bootcamp.job_guarantee)
        .bind(bootcamp.accept_gi)
        .bind(bootcamp.created_at)
        .fetch_one(&self.pool)
        .await?;

        Bootcamp::try_from(row)
    }

    async fn update(&self, bootcamp: &Bootcamp) -> Result<Bootcamp, DatabaseError> {
        let row = sqlx::query_as::<_, BootcampRow>(
            r#"
            UPDATE bootcamps SET
                name = $2, slug = $3, description = $4, website = $5, phone = $6, email = $7,
                longitude = $8, latitude = $9, formatted_address = $10, street = $11, city = $12,
                state = $13, zipcode = $14, country = $15, careers = $16, average_cost = $17,
                housing = $18, job_assistance = $19, job_guarantee = $20, accept_gi = $21
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(bootcamp.id)
        .bind(&bootcamp.name)
        .bind(&bootcamp.slug)
        .bind(&bootcamp.description)
        .bind(&bootcamp.website)
        .bind(&bootcamp.phone)
        .bind(&bootcamp.email)
        .bind(bootcamp.location.coordinates[0])
        .bind(bootcamp.location.coordinates[1])
        .bind(&bootcamp.location.formatted_address)
        .bind(&bootcamp.location.street)
        .bind(&bootcamp.location.city)
        .bind(&bootcamp.location.state)
        .bind(&bootcamp.location.zipcode)
        .bind(&bootcamp.location.country)
        .bind(career_names(bootcamp))
        .bind(bootcamp.average_cost)
        .bind(bootcamp.housing)
        .bind(bootcamp.job_assistance)
        .bind(bootcamp.job_guarantee)
        .bind(bootcamp.accept_gi)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("bootcamp {}", bootcamp.id)))?;

        Bootcamp::try_from(row)
    }

    async fn set_photo(&self, id: Uuid, photo: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE bootcamps SET photo = $2 WHERE id = $1")
            .bind(id)
            .bind(photo)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("bootcamp {}", id)));
        }
        Ok(())
    }

    async fn set_average_rating(&self, id: Uuid, rating: Option<f64>) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE bootcamps SET average_rating = $2 WHERE id = $1")
            .bind(id)
            .bind(rating)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM bootcamps WHERE id = $1").bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("bootcamp {}", id)));
        }
        Ok(())
    }
}
