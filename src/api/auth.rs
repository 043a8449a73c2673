//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        auth::{LoginRequest, LoginResponse},
        library::{LibraryProfile, RegisterLibrary},
    },
    AppState,
};

/// Log in as an administrator, moderator or library
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed request", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
        (status = 403, description = "Account inactive", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = state.services.auth.login(request).await?;
    Ok(Json(response))
}

/// Register a new library, pending approval
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterLibrary,
    responses(
        (status = 201, description = "Library registered", body = LibraryProfile),
        (status = 400, description = "Invalid input or address", body = crate::error::ErrorResponse),
        (status = 409, description = "Email or CNPJ already registered", body = crate::error::ErrorResponse),
        (status = 502, description = "Geocoding service unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterLibrary>,
) -> AppResult<(StatusCode, Json<LibraryProfile>)> {
    let library = state.services.auth.register_library(request).await?;
    Ok((StatusCode::CREATED, Json(library)))
}
