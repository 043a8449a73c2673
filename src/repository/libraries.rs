//! Library domain methods on Repository

use chrono::Utc;

use super::{conflict_on_unique, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        auth::LibraryCredential,
        enums::LibraryStatus,
        library::{
            Holding, LibraryMapPoint, LibraryRecord, NewAddress, NewLibrary, UpdateLibrary, LIBRARY_COLUMNS,
            LIBRARY_FROM,
        },
        pagination::PageRequest,
    },
};

const SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "l.id"),
    ("trade_name", "l.trade_name"),
    ("status", "l.status"),
    ("created_at", "l.created_at"),
    ("district", "a.district"),
];

impl Repository {
    /// List libraries, optionally filtered by status and city
    pub async fn libraries_list(
        &self,
        status: Option<LibraryStatus>,
        city: Option<&str>,
        page: &PageRequest,
    ) -> AppResult<(Vec<LibraryRecord>, i64)> {
        let filter = r#"
            WHERE ($1::TEXT IS NULL OR l.status = $1)
              AND ($2::TEXT IS NULL OR LOWER(a.city) = LOWER($2))
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {} {}", LIBRARY_FROM, filter))
            .bind(status)
            .bind(city)
            .fetch_one(&self.pool)
            .await?;

        let query = format!(
            "SELECT {} {} {} {} LIMIT $3 OFFSET $4",
            LIBRARY_COLUMNS,
            LIBRARY_FROM,
            filter,
            page.order_by(SORT_COLUMNS)
        );

        let rows = sqlx::query_as::<_, LibraryRecord>(&query)
            .bind(status)
            .bind(city)
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Get library by ID
    pub async fn libraries_get_by_id(&self, id: i64) -> AppResult<LibraryRecord> {
        sqlx::query_as::<_, LibraryRecord>(&format!(
            "SELECT {} {} WHERE l.id = $1",
            LIBRARY_COLUMNS, LIBRARY_FROM
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))
    }

    /// Check if a CNPJ is already registered
    pub async fn libraries_cnpj_exists(&self, cnpj: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM libraries WHERE cnpj = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(cnpj)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert address, library and login in one transaction
    pub async fn libraries_create(&self, library: &NewLibrary) -> AppResult<LibraryRecord> {
        let mut tx = self.pool.begin().await?;
        let address = &library.address;

        let address_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO addresses (cep, street, number, complement, district, city, state, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&address.cep)
        .bind(address.input.street.trim())
        .bind(address.input.number.trim())
        .bind(address.input.complement.as_deref().map(str::trim))
        .bind(address.input.district.trim())
        .bind(address.input.city.trim())
        .bind(address.input.state.trim())
        .bind(address.position.latitude)
        .bind(address.position.longitude)
        .fetch_one(&mut *tx)
        .await?;

        let library_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO libraries (trade_name, legal_name, cnpj, phone, category, website, status, address_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&library.trade_name)
        .bind(&library.legal_name)
        .bind(&library.cnpj)
        .bind(&library.phone)
        .bind(library.category)
        .bind(&library.website)
        .bind(LibraryStatus::Pending)
        .bind(address_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "CNPJ already registered"))?;

        sqlx::query("INSERT INTO library_credentials (library_id, email, password_hash) VALUES ($1, $2, $3)")
            .bind(library_id)
            .bind(&library.email)
            .bind(&library.password_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, "Email already registered"))?;

        tx.commit().await?;

        self.libraries_get_by_id(library_id).await
    }

    /// Apply a partial profile update, replacing the address when one is given
    pub async fn libraries_update_profile(
        &self,
        id: i64,
        changes: &UpdateLibrary,
        address: Option<&NewAddress>,
    ) -> AppResult<LibraryRecord> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let address_id: i64 = sqlx::query_scalar(
            r#"
            UPDATE libraries SET
                trade_name = COALESCE($2, trade_name),
                legal_name = COALESCE($3, legal_name),
                phone = COALESCE($4, phone),
                category = COALESCE($5, category),
                website = COALESCE($6, website),
                photo = COALESCE($7, photo),
                updated_at = $8
            WHERE id = $1
            RETURNING address_id
            "#,
        )
        .bind(id)
        .bind(&changes.trade_name)
        .bind(&changes.legal_name)
        .bind(&changes.phone)
        .bind(changes.category)
        .bind(&changes.website)
        .bind(&changes.photo)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))?;

        if let Some(address) = address {
            sqlx::query(
                r#"
                UPDATE addresses SET
                    cep = $2, street = $3, number = $4, complement = $5, district = $6,
                    city = $7, state = $8, latitude = $9, longitude = $10, updated_at = $11
                WHERE id = $1
                "#,
            )
            .bind(address_id)
            .bind(&address.cep)
            .bind(address.input.street.trim())
            .bind(address.input.number.trim())
            .bind(address.input.complement.as_deref().map(str::trim))
            .bind(address.input.district.trim())
            .bind(address.input.city.trim())
            .bind(address.input.state.trim())
            .bind(address.position.latitude)
            .bind(address.position.longitude)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.libraries_get_by_id(id).await
    }

    /// Change a library's status
    pub async fn libraries_update_status(&self, id: i64, status: LibraryStatus) -> AppResult<LibraryRecord> {
        let result = sqlx::query("UPDATE libraries SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Library with id {} not found", id)));
        }

        self.libraries_get_by_id(id).await
    }

    /// Delete a library with its address; login and collection cascade
    pub async fn libraries_delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let address_id: i64 = sqlx::query_scalar("DELETE FROM libraries WHERE id = $1 RETURNING address_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))?;

        sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(address_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Count libraries, optionally only those with a given status
    pub async fn libraries_count(&self, status: Option<LibraryStatus>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM libraries WHERE ($1::TEXT IS NULL OR status = $1)")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Every geocoded library, for the dashboard map
    pub async fn libraries_map_points(&self) -> AppResult<Vec<LibraryMapPoint>> {
        let rows = sqlx::query_as::<_, LibraryMapPoint>(
            r#"
            SELECT l.id, l.trade_name, a.latitude, a.longitude, l.status, a.city
            FROM libraries l
            JOIN addresses a ON a.id = l.address_id
            WHERE a.latitude IS NOT NULL AND a.longitude IS NOT NULL
            ORDER BY l.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Active libraries of a city holding a book, in id order
    pub async fn libraries_holding_book(&self, book_id: i64, city: &str) -> AppResult<Vec<Holding>> {
        let query = format!(
            r#"
            SELECT {}, lb.quantity
            {}
            JOIN library_books lb ON lb.library_id = l.id
            WHERE lb.book_id = $1
              AND lb.quantity > 0
              AND l.status = $2
              AND LOWER(a.city) = LOWER($3)
            ORDER BY l.id
            "#,
            LIBRARY_COLUMNS, LIBRARY_FROM
        );

        let rows = sqlx::query_as::<_, Holding>(&query)
            .bind(book_id)
            .bind(LibraryStatus::Active)
            .bind(city)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Library login by email
    pub async fn credentials_get_by_email(&self, email: &str) -> AppResult<Option<LibraryCredential>> {
        let row = sqlx::query_as::<_, LibraryCredential>(
            r#"
            SELECT c.library_id, c.email, c.password_hash, l.status
            FROM library_credentials c
            JOIN libraries l ON l.id = c.library_id
            WHERE LOWER(c.email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
