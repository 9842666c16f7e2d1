use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::handlers::{bootcamps, reviews, system, users};
use crate::middleware::{jwt_auth_middleware, require_admin};
use crate::state::AppState;

/// Full application router
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .merge(admin_routes(state.clone()));

    let mut router = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if let Some(cors) = cors_layer(&state.config) {
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/bootcamps", get(bootcamps::bootcamps_list))
        .route("/bootcamps/:id", get(bootcamps::bootcamp_get))
        .route("/bootcamps/radius/:zipcode/:distance", get(bootcamps::bootcamps_in_radius))
        .route("/bootcamps/:id/reviews", get(reviews::bootcamp_reviews))
        .route("/reviews", get(reviews::reviews_list))
        .route("/reviews/:id", get(reviews::review_get))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    let photo_limit = photo_body_limit(&state.config);

    Router::new()
        .route("/bootcamps", post(bootcamps::bootcamp_create))
        .route(
            "/bootcamps/:id",
            put(bootcamps::bootcamp_update).delete(bootcamps::bootcamp_delete),
        )
        .route(
            "/bootcamps/:id/photo",
            put(bootcamps::bootcamp_photo).layer(DefaultBodyLimit::max(photo_limit)),
        )
        .route("/bootcamps/:id/reviews", post(reviews::review_create))
        .route("/reviews/:id", put(reviews::review_update).delete(reviews::review_delete))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

/// Room for one file at the upload limit plus multipart framing. The photo
/// handler enforces `max_file_upload` itself while streaming the field.
fn photo_body_limit(config: &AppConfig) -> usize {
    let file = usize::try_from(config.upload.max_file_upload).unwrap_or(usize::MAX);
    config
        .api
        .max_request_size_bytes
        .max(file.saturating_add(MULTIPART_HEADROOM))
}

const MULTIPART_HEADROOM: usize = 64 * 1024;

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(users::users_list).post(users::user_create))
        .route(
            "/users/:id",
            get(users::user_get).put(users::user_update).delete(users::user_delete),
        )
        // Last layer runs first: authenticate, then gate on role
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }
    if config.environment == Environment::Development {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
