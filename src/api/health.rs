//! Welcome and health check endpoints

use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const SERVICE_NAME: &str = "localibrary";

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `UP` while the process serves requests
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct WelcomeResponse {
    pub name: String,
    pub description: String,
    pub version: String,
    /// Entry points worth knowing, by name
    pub links: Vec<WelcomeLink>,
    pub documentation: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct WelcomeLink {
    pub name: String,
    pub href: String,
}

fn link(name: &str, href: &str) -> WelcomeLink {
    WelcomeLink {
        name: name.to_string(),
        href: href.to_string(),
    }
}

/// API welcome document
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Welcome document", body = WelcomeResponse)
    )
)]
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        name: "Localibrary API".to_string(),
        description: "Find books in libraries near you in São Paulo".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        links: vec![
            link("health", "/api/v1/health"),
            link("books", "/api/v1/books"),
            link("popular", "/api/v1/books/popular"),
            link("libraries", "/api/v1/libraries"),
            link("login", "/api/v1/auth/login"),
            link("register", "/api/v1/auth/register"),
        ],
        documentation: "/swagger-ui".to_string(),
    })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
