//! Back-office endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        admin::{AdminView, CreateModerator, Dashboard, UpdateAdminStatus},
        library::{LibraryFilter, LibraryProfile, UpdateLibraryStatus},
        pagination::{LibraryProfilePage, Page, PageQuery, PageRequest},
    },
    AppState,
};

use super::AuthenticatedUser;

/// Platform totals and the library map
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard", body = Dashboard),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Dashboard>> {
    claims.require_staff()?;

    let dashboard = state.services.admin.dashboard().await?;
    Ok(Json(dashboard))
}

/// All libraries, optionally filtered by status
#[utoipa::path(
    get,
    path = "/admin/libraries",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(LibraryFilter, PageQuery),
    responses(
        (status = 200, description = "One page of libraries", body = LibraryProfilePage),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_libraries(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(filter): Query<LibraryFilter>,
    Query(paging): Query<PageQuery>,
) -> AppResult<Json<Page<LibraryProfile>>> {
    claims.require_staff()?;

    let page = PageRequest::from(&paging);
    let libraries = state.services.admin.list_libraries(filter.status, &page).await?;
    Ok(Json(libraries))
}

/// Approve, deactivate or reactivate a library
#[utoipa::path(
    patch,
    path = "/admin/libraries/{id}/status",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID")
    ),
    request_body = UpdateLibraryStatus,
    responses(
        (status = 200, description = "Status changed", body = LibraryProfile),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Library not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_library_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateLibraryStatus>,
) -> AppResult<Json<LibraryProfile>> {
    claims.require_staff()?;

    let library = state.services.admin.update_library_status(id, request.status).await?;
    Ok(Json(library))
}

/// Delete a library with its login and collection
#[utoipa::path(
    delete,
    path = "/admin/libraries/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID")
    ),
    responses(
        (status = 204, description = "Library deleted"),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Library not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_library(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.admin.delete_library(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List moderators
#[utoipa::path(
    get,
    path = "/admin/moderators",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Moderators", body = Vec<AdminView>),
        (status = 403, description = "Administrators only")
    )
)]
pub async fn list_moderators(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<AdminView>>> {
    claims.require_admin()?;

    let moderators = state.services.admin.list_moderators().await?;
    Ok(Json(moderators))
}

/// Create a moderator account
#[utoipa::path(
    post,
    path = "/admin/moderators",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateModerator,
    responses(
        (status = 201, description = "Moderator created", body = AdminView),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrators only"),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_moderator(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateModerator>,
) -> AppResult<(StatusCode, Json<AdminView>)> {
    claims.require_admin()?;

    let moderator = state.services.admin.create_moderator(request).await?;
    Ok((StatusCode::CREATED, Json(moderator)))
}

/// Activate or deactivate a moderator
#[utoipa::path(
    patch,
    path = "/admin/moderators/{id}/status",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Moderator ID")
    ),
    request_body = UpdateAdminStatus,
    responses(
        (status = 200, description = "Status changed", body = AdminView),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Moderator not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_moderator_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateAdminStatus>,
) -> AppResult<Json<AdminView>> {
    claims.require_admin()?;

    let moderator = state.services.admin.update_moderator_status(id, request.status).await?;
    Ok(Json(moderator))
}

/// Delete a moderator account
#[utoipa::path(
    delete,
    path = "/admin/moderators/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Moderator ID")
    ),
    responses(
        (status = 204, description = "Moderator deleted"),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Moderator not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_moderator(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;

    state.services.admin.delete_moderator(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
