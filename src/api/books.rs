//! Public catalog endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    geo::Coordinate,
    models::{
        book::{BookDetails, BookSearch, BookShort, ProximityQuery},
        library::LibraryForBook,
        pagination::{BookPage, Page, PageQuery, PageRequest},
    },
    AppState,
};

/// Search books by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookSearch, PageQuery),
    responses(
        (status = 200, description = "One page of books", body = BookPage)
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    Query(search): Query<BookSearch>,
    Query(paging): Query<PageQuery>,
) -> AppResult<Json<Page<BookShort>>> {
    let page = PageRequest::from(&paging);
    let books = state.services.catalog.search(search.title.as_deref(), &page).await?;
    Ok(Json(books))
}

/// Most held books across active libraries
#[utoipa::path(
    get,
    path = "/books/popular",
    tag = "books",
    responses(
        (status = 200, description = "Top books", body = Vec<BookShort>)
    )
)]
pub async fn popular_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookShort>>> {
    let books = state.services.catalog.popular().await?;
    Ok(Json(books))
}

/// Book details with genres and similar books
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.details(id).await?;
    Ok(Json(book))
}

/// Libraries holding a book, nearest first when `lat` and `lon` are given
#[utoipa::path(
    get,
    path = "/books/{id}/libraries",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID"),
        ProximityQuery
    ),
    responses(
        (status = 200, description = "Libraries holding the book", body = Vec<LibraryForBook>),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn libraries_for_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(position): Query<ProximityQuery>,
) -> AppResult<Json<Vec<LibraryForBook>>> {
    let reference = Coordinate::from_parts(position.lat, position.lon);
    let libraries = state.services.catalog.libraries_for_book(id, reference).await?;
    Ok(Json(libraries))
}
