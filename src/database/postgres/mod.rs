//! Postgres-backed repositories

mod bootcamps;
mod reviews;
mod users;

use sqlx::PgPool;

/// Repository implementations sharing one connection pool
#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
