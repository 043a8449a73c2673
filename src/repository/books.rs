//! Book and genre methods on Repository

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookShort, Genre},
        enums::LibraryStatus,
        pagination::PageRequest,
    },
};

const SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "b.id"),
    ("title", "b.title"),
    ("author", "b.author"),
    ("publication_year", "b.publication_year"),
    ("created_at", "b.created_at"),
];

impl Repository {
    /// Search books by title fragment (case-insensitive)
    pub async fn books_search(&self, title: Option<&str>, page: &PageRequest) -> AppResult<(Vec<BookShort>, i64)> {
        let pattern = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("%{}%", t.to_lowercase()));

        let filter = "WHERE ($1::TEXT IS NULL OR LOWER(b.title) LIKE $1)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM books b {}", filter))
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            r#"
            SELECT b.id, b.isbn, b.title, b.author, b.publication_year, b.cover
            FROM books b
            {}
            {}
            LIMIT $2 OFFSET $3
            "#,
            filter,
            page.order_by(SORT_COLUMNS)
        );

        let books = sqlx::query_as::<_, BookShort>(&query)
            .bind(&pattern)
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    /// Books with the most copies across active libraries
    pub async fn books_popular(&self, limit: i64) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT b.id, b.isbn, b.title, b.author, b.publication_year, b.cover
            FROM books b
            JOIN library_books lb ON lb.book_id = b.id
            JOIN libraries l ON l.id = lb.library_id
            WHERE l.status = $1
            GROUP BY b.id
            ORDER BY SUM(lb.quantity) DESC, b.id
            LIMIT $2
            "#,
        )
        .bind(LibraryStatus::Active)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Get book by ID
    pub async fn books_get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check whether an ISBN belongs to another book
    pub async fn books_isbn_taken(&self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Genres of a book, by name
    pub async fn books_genres(&self, book_id: i64) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM genres g
            JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    /// Other books sharing at least one genre
    pub async fn books_similar(&self, book_id: i64, limit: i64) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT b.id, b.isbn, b.title, b.author, b.publication_year, b.cover
            FROM books b
            WHERE b.id <> $1
              AND EXISTS (
                  SELECT 1
                  FROM book_genres mine
                  JOIN book_genres theirs ON theirs.genre_id = mine.genre_id
                  WHERE mine.book_id = $1 AND theirs.book_id = b.id
              )
            ORDER BY b.id
            LIMIT $2
            "#,
        )
        .bind(book_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    pub async fn books_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Which of the given genre ids do not exist
    pub async fn genres_missing(&self, ids: &[i64]) -> AppResult<Vec<i64>> {
        let missing: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT u.id
            FROM UNNEST($1::BIGINT[]) AS u(id)
            WHERE NOT EXISTS (SELECT 1 FROM genres g WHERE g.id = u.id)
            ORDER BY u.id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(missing)
    }
}
