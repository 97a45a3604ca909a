pub mod auth;
pub mod vacations;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Room for the text fields and multipart framing around the largest image.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: public, user, admin and follower routes
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let images = ServeDir::new(state.images().dir());

    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/api/user/register", post(auth::register))
        .route("/api/user/login", post(auth::login))
        .route("/api/user/logout", post(auth::logout))
        .route("/api/user/check-email", get(auth::check_email))
        .nest_service("/images", images);

    let user = Router::new()
        .route("/api/user/me", get(auth::me))
        .route("/api/vacations", get(vacations::list))
        .route("/api/vacations/:id", get(vacations::get_one));

    let admin = Router::new()
        .route("/api/vacations", post(vacations::create))
        .route("/api/vacations/report", get(vacations::report))
        .route("/api/vacations/report/csv", get(vacations::report_csv))
        .route("/api/vacations/:id", axum::routing::put(vacations::update).delete(vacations::delete))
        .layer(DefaultBodyLimit::max(state.images().max_bytes() + FORM_OVERHEAD_BYTES))
        .route_layer(middleware::from_fn(auth::require_admin));

    let follower = Router::new()
        .route("/api/vacations/:id/follow", post(vacations::follow).delete(vacations::unfollow))
        .route_layer(middleware::from_fn(auth::require_non_admin));

    let protected = user
        .merge(admin)
        .merge(follower)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    public
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request (method, path)
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
