use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "DevCamper API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "bootcamps": "/api/v1/bootcamps[/:id] (public reads, publisher/admin writes)",
                "radius": "/api/v1/bootcamps/radius/:zipcode/:distance (public)",
                "photo": "/api/v1/bootcamps/:id/photo (publisher/admin)",
                "reviews": "/api/v1/reviews[/:id], /api/v1/bootcamps/:id/reviews",
                "users": "/api/v1/users[/:id] (admin)",
                "health": "/health"
            }
        }
    }))
}

/// GET /health - database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let reachable = match &state.pool {
        Some(pool) => DatabaseManager::health_check(pool).await.map(|_| "ok"),
        None => Ok("memory"),
    };

    match reachable {
        Ok(database) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": database }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "Database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
