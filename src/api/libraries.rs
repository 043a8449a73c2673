//! Library endpoints: public pages and each library's own area

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{AddBook, CollectionBook, HeldBook, UpdateBook, UpdateQuantity},
        library::{LibraryDetails, LibraryProfile, LibrarySummary, UpdateLibrary},
        pagination::{CollectionPage, LibraryPage, Page, PageQuery, PageRequest},
    },
    services::libraries::CollectionChange,
    AppState,
};

use super::AuthenticatedUser;

impl IntoResponse for CollectionChange {
    fn into_response(self) -> Response {
        match self {
            CollectionChange::Updated(book) => Json(book).into_response(),
            CollectionChange::Removed => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Active libraries
#[utoipa::path(
    get,
    path = "/libraries",
    tag = "libraries",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of libraries", body = LibraryPage)
    )
)]
pub async fn list_libraries(
    State(state): State<AppState>,
    Query(paging): Query<PageQuery>,
) -> AppResult<Json<Page<LibrarySummary>>> {
    let page = PageRequest::from(&paging);
    let libraries = state.services.libraries.list_active(&page).await?;
    Ok(Json(libraries))
}

/// Public page of an active library
#[utoipa::path(
    get,
    path = "/libraries/{id}",
    tag = "libraries",
    params(
        ("id" = i64, Path, description = "Library ID")
    ),
    responses(
        (status = 200, description = "Library with its books", body = LibraryDetails),
        (status = 404, description = "Library not found or not active", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_library(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<LibraryDetails>> {
    let library = state.services.libraries.public_details(id).await?;
    Ok(Json(library))
}

/// Own profile
#[utoipa::path(
    get,
    path = "/libraries/{id}/profile",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID")
    ),
    responses(
        (status = 200, description = "Library profile", body = LibraryProfile),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not this library")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<LibraryProfile>> {
    claims.require_library(id)?;

    let profile = state.services.libraries.profile(id).await?;
    Ok(Json(profile))
}

/// Update own profile; absent fields are kept
#[utoipa::path(
    put,
    path = "/libraries/{id}/profile",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID")
    ),
    request_body = UpdateLibrary,
    responses(
        (status = 200, description = "Profile updated", body = LibraryProfile),
        (status = 400, description = "Invalid input or address", body = crate::error::ErrorResponse),
        (status = 403, description = "Not this library")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(changes): Json<UpdateLibrary>,
) -> AppResult<Json<LibraryProfile>> {
    claims.require_library(id)?;

    let profile = state.services.libraries.update_profile(id, changes).await?;
    Ok(Json(profile))
}

/// Own collection
#[utoipa::path(
    get,
    path = "/libraries/{id}/books",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of held books", body = CollectionPage),
        (status = 403, description = "Not this library")
    )
)]
pub async fn list_collection(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Query(paging): Query<PageQuery>,
) -> AppResult<Json<Page<HeldBook>>> {
    claims.require_library(id)?;

    let page = PageRequest::from(&paging);
    let books = state.services.libraries.collection(id, &page).await?;
    Ok(Json(books))
}

/// Add a book to the collection, creating it when the ISBN is new
#[utoipa::path(
    post,
    path = "/libraries/{id}/books",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID")
    ),
    request_body = AddBook,
    responses(
        (status = 201, description = "Book added", body = CollectionBook),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown genre", body = crate::error::ErrorResponse),
        (status = 409, description = "Already in the collection", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<AddBook>,
) -> AppResult<(StatusCode, Json<CollectionBook>)> {
    claims.require_library(id)?;

    let entry = state.services.libraries.add_book(id, request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// A held book, for editing
#[utoipa::path(
    get,
    path = "/libraries/{id}/books/{book_id}",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Collection entry", body = CollectionBook),
        (status = 404, description = "Not in the collection", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_collection_entry(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, book_id)): Path<(i64, i64)>,
) -> AppResult<Json<CollectionBook>> {
    claims.require_library(id)?;

    let entry = state.services.libraries.collection_entry(id, book_id).await?;
    Ok(Json(entry))
}

/// Edit a held book; quantity 0 removes it
#[utoipa::path(
    put,
    path = "/libraries/{id}/books/{book_id}",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = HeldBook),
        (status = 204, description = "Book removed from the collection"),
        (status = 404, description = "Not in the collection", body = crate::error::ErrorResponse),
        (status = 409, description = "ISBN used by another book", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, book_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateBook>,
) -> AppResult<CollectionChange> {
    claims.require_library(id)?;

    state.services.libraries.update_book(id, book_id, request).await
}

/// Set the number of copies; 0 removes the book
#[utoipa::path(
    patch,
    path = "/libraries/{id}/books/{book_id}/quantity",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    request_body = UpdateQuantity,
    responses(
        (status = 200, description = "Quantity updated", body = HeldBook),
        (status = 204, description = "Book removed from the collection"),
        (status = 404, description = "Not in the collection", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, book_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateQuantity>,
) -> AppResult<CollectionChange> {
    claims.require_library(id)?;

    state
        .services
        .libraries
        .update_quantity(id, book_id, request.quantity)
        .await
}

/// Remove a book from the collection
#[utoipa::path(
    delete,
    path = "/libraries/{id}/books/{book_id}",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Library ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book removed"),
        (status = 404, description = "Not in the collection", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path((id, book_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    claims.require_library(id)?;

    state.services.libraries.remove_book(id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
