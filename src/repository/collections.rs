//! Per-library collection methods on Repository

use chrono::Utc;
use sqlx::{Postgres, Transaction};

use super::{conflict_on_unique, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{book::BookInput, book::HeldBook, pagination::PageRequest},
};

const SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "b.id"),
    ("title", "b.title"),
    ("author", "b.author"),
    ("quantity", "lb.quantity"),
];

const HELD_BOOK_SELECT: &str = r#"
    SELECT b.id, b.isbn, b.title, b.author, b.publication_year, b.cover, lb.quantity
    FROM library_books lb
    JOIN books b ON b.id = lb.book_id
    WHERE lb.library_id = $1
"#;

impl Repository {
    /// Paged collection of a library
    pub async fn collection_list(&self, library_id: i64, page: &PageRequest) -> AppResult<(Vec<HeldBook>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM library_books WHERE library_id = $1")
            .bind(library_id)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "{} {} LIMIT $2 OFFSET $3",
            HELD_BOOK_SELECT,
            page.order_by(SORT_COLUMNS)
        );

        let books = sqlx::query_as::<_, HeldBook>(&query)
            .bind(library_id)
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    /// Whole collection of a library, by title
    pub async fn collection_all(&self, library_id: i64) -> AppResult<Vec<HeldBook>> {
        let books = sqlx::query_as::<_, HeldBook>(&format!("{} ORDER BY b.title", HELD_BOOK_SELECT))
            .bind(library_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Copies of a book held by a library, if any
    pub async fn collection_quantity(&self, library_id: i64, book_id: i64) -> AppResult<Option<i32>> {
        let quantity: Option<i32> =
            sqlx::query_scalar("SELECT quantity FROM library_books WHERE library_id = $1 AND book_id = $2")
                .bind(library_id)
                .bind(book_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(quantity)
    }

    /// Add a book to a collection, creating the book when its ISBN is unknown.
    ///
    /// Returns the book id.
    pub async fn collection_add(&self, library_id: i64, input: &BookInput, quantity: i32) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM books WHERE isbn = $1")
            .bind(&input.isbn)
            .fetch_optional(&mut *tx)
            .await?;

        let book_id = match existing {
            Some(id) => id,
            None => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO books (isbn, title, author, publisher, publication_year, cover, synopsis, author_photo)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    RETURNING id
                    "#,
                )
                .bind(&input.isbn)
                .bind(input.title.trim())
                .bind(input.author.trim())
                .bind(&input.publisher)
                .bind(input.publication_year)
                .bind(&input.cover)
                .bind(&input.synopsis)
                .bind(&input.author_photo)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| conflict_on_unique(e, "ISBN already registered"))?
            }
        };

        if let Some(genre_ids) = &input.genre_ids {
            replace_genres(&mut tx, book_id, genre_ids).await?;
        }

        sqlx::query("INSERT INTO library_books (library_id, book_id, quantity) VALUES ($1, $2, $3)")
            .bind(library_id)
            .bind(book_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, "Book already in this collection"))?;

        tx.commit().await?;
        Ok(book_id)
    }

    /// Rewrite a held book and its copy count; a count of 0 drops the entry.
    pub async fn collection_update(
        &self,
        library_id: i64,
        book_id: i64,
        input: &BookInput,
        quantity: i32,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE books SET
                isbn = $2, title = $3, author = $4, publisher = $5, publication_year = $6,
                cover = $7, synopsis = $8, author_photo = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(book_id)
        .bind(&input.isbn)
        .bind(input.title.trim())
        .bind(input.author.trim())
        .bind(&input.publisher)
        .bind(input.publication_year)
        .bind(&input.cover)
        .bind(&input.synopsis)
        .bind(&input.author_photo)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "ISBN already registered"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }

        if let Some(genre_ids) = &input.genre_ids {
            replace_genres(&mut tx, book_id, genre_ids).await?;
        }

        let entry = if quantity == 0 {
            sqlx::query("DELETE FROM library_books WHERE library_id = $1 AND book_id = $2")
                .bind(library_id)
                .bind(book_id)
                .execute(&mut *tx)
                .await?
        } else {
            sqlx::query("UPDATE library_books SET quantity = $3 WHERE library_id = $1 AND book_id = $2")
                .bind(library_id)
                .bind(book_id)
                .bind(quantity)
                .execute(&mut *tx)
                .await?
        };

        if entry.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book {} is not in the collection of library {}",
                book_id, library_id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Set the copy count of a held book. Returns false when the entry does not exist.
    pub async fn collection_set_quantity(&self, library_id: i64, book_id: i64, quantity: i32) -> AppResult<bool> {
        let result = sqlx::query("UPDATE library_books SET quantity = $3 WHERE library_id = $1 AND book_id = $2")
            .bind(library_id)
            .bind(book_id)
            .bind(quantity)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop a book from a collection. Returns false when the entry does not exist.
    pub async fn collection_remove(&self, library_id: i64, book_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM library_books WHERE library_id = $1 AND book_id = $2")
            .bind(library_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total copies over every collection
    pub async fn collection_total_copies(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM library_books")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

async fn replace_genres(tx: &mut Transaction<'_, Postgres>, book_id: i64, genre_ids: &[i64]) -> AppResult<()> {
    sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO book_genres (book_id, genre_id)
        SELECT $1, g FROM UNNEST($2::BIGINT[]) AS g
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(book_id)
    .bind(genre_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
