use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::{BootcampRepository, MemoryDatabase, PgDatabase, ReviewRepository, UserRepository};
use crate::geo::Geocoder;

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub bootcamps: Arc<dyn BootcampRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub users: Arc<dyn UserRepository>,
    pub geocoder: Arc<dyn Geocoder>,
    /// `None` when running on the in-memory store
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn postgres(config: AppConfig, pool: PgPool, geocoder: Arc<dyn Geocoder>) -> Self {
        let db = Arc::new(PgDatabase::new(pool.clone()));
        Self {
            config: Arc::new(config),
            bootcamps: db.clone(),
            reviews: db.clone(),
            users: db,
            geocoder,
            pool: Some(pool),
        }
    }

    pub fn in_memory(config: AppConfig, geocoder: Arc<dyn Geocoder>) -> Self {
        let db = Arc::new(MemoryDatabase::new());
        Self {
            config: Arc::new(config),
            bootcamps: db.clone(),
            reviews: db.clone(),
            users: db,
            geocoder,
            pool: None,
        }
    }
}
