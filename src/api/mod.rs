//! API handlers for Localibrary REST endpoints

pub mod admin;
pub mod auth;
pub mod books;
pub mod health;
pub mod libraries;
pub mod openapi;
pub mod uploads;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{error::AppError, models::auth::Claims, services::storage::UPLOADS_ROUTE, AppState};

/// Room for multipart framing around the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Extractor for the authenticated principal from the JWT bearer token
pub struct AuthenticatedUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = Claims::from_token(token.trim(), &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = state.services.storage.max_file_size() + MULTIPART_OVERHEAD;

    let api_v1 = Router::new()
        // System
        .route("/", get(health::welcome))
        .route("/health", get(health::health_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        // Catalog
        .route("/books", get(books::search_books))
        .route("/books/popular", get(books::popular_books))
        .route("/books/:id", get(books::get_book))
        .route("/books/:id/libraries", get(books::libraries_for_book))
        // Libraries, public
        .route("/libraries", get(libraries::list_libraries))
        .route("/libraries/:id", get(libraries::get_library))
        // Libraries, own area
        .route(
            "/libraries/:id/profile",
            get(libraries::get_profile).put(libraries::update_profile),
        )
        .route(
            "/libraries/:id/books",
            get(libraries::list_collection).post(libraries::add_book),
        )
        .route(
            "/libraries/:id/books/:book_id",
            get(libraries::get_collection_entry)
                .put(libraries::update_book)
                .delete(libraries::remove_book),
        )
        .route(
            "/libraries/:id/books/:book_id/quantity",
            patch(libraries::update_quantity),
        )
        // Back office
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/libraries", get(admin::list_libraries))
        .route("/admin/libraries/:id/status", patch(admin::update_library_status))
        .route("/admin/libraries/:id", delete(admin::delete_library))
        .route(
            "/admin/moderators",
            get(admin::list_moderators).post(admin::create_moderator),
        )
        .route("/admin/moderators/:id/status", patch(admin::update_moderator_status))
        .route("/admin/moderators/:id", delete(admin::delete_moderator))
        // Uploads
        .route(
            "/uploads/:kind",
            post(uploads::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_v1)
        .nest_service(UPLOADS_ROUTE, ServeDir::new(state.services.storage.root()))
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
