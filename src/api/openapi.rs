//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, auth, books, health, libraries, uploads};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Localibrary API",
        version = "1.0.0",
        description = "Find books in nearby libraries of São Paulo",
        license(name = "MIT")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // System
        health::welcome,
        health::health_check,
        // Auth
        auth::login,
        auth::register,
        // Books
        books::search_books,
        books::popular_books,
        books::get_book,
        books::libraries_for_book,
        // Libraries
        libraries::list_libraries,
        libraries::get_library,
        libraries::get_profile,
        libraries::update_profile,
        libraries::list_collection,
        libraries::add_book,
        libraries::get_collection_entry,
        libraries::update_book,
        libraries::update_quantity,
        libraries::remove_book,
        // Admin
        admin::dashboard,
        admin::list_libraries,
        admin::update_library_status,
        admin::delete_library,
        admin::list_moderators,
        admin::create_moderator,
        admin::update_moderator_status,
        admin::delete_moderator,
        // Uploads
        uploads::upload,
    ),
    components(
        schemas(
            // Auth
            crate::models::auth::LoginRequest,
            crate::models::auth::LoginResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetails,
            crate::models::book::HeldBook,
            crate::models::book::CollectionBook,
            crate::models::book::BookInput,
            crate::models::book::AddBook,
            crate::models::book::UpdateBook,
            crate::models::book::UpdateQuantity,
            // Libraries
            crate::models::library::AddressView,
            crate::models::library::AddressInput,
            crate::models::library::LibrarySummary,
            crate::models::library::LibraryDetails,
            crate::models::library::LibraryProfile,
            crate::models::library::LibraryForBook,
            crate::models::library::LibraryMapPoint,
            crate::models::library::RegisterLibrary,
            crate::models::library::UpdateLibrary,
            crate::models::library::UpdateLibraryStatus,
            // Admin
            crate::models::admin::AdminView,
            crate::models::admin::CreateModerator,
            crate::models::admin::UpdateAdminStatus,
            crate::models::admin::Dashboard,
            // Enums
            crate::models::enums::LibraryStatus,
            crate::models::enums::LibraryCategory,
            crate::models::enums::AdminRole,
            crate::models::enums::AdminStatus,
            crate::models::enums::UploadKind,
            // Pages
            crate::models::pagination::BookPage,
            crate::models::pagination::LibraryPage,
            crate::models::pagination::LibraryProfilePage,
            crate::models::pagination::CollectionPage,
            // Uploads
            crate::models::upload::UploadResponse,
            uploads::UploadForm,
            // System
            health::HealthResponse,
            health::WelcomeResponse,
            health::WelcomeLink,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "system", description = "Welcome and health check"),
        (name = "auth", description = "Login and library registration"),
        (name = "books", description = "Public catalog"),
        (name = "libraries", description = "Library pages and collections"),
        (name = "admin", description = "Back office"),
        (name = "uploads", description = "Image uploads")
    )
)]
pub struct ApiDoc;

/// Declares the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
