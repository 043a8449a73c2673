//! Back-office account methods on Repository

use chrono::Utc;

use super::{conflict_on_unique, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        admin::{Admin, NewAdmin},
        enums::{AdminRole, AdminStatus},
    },
};

impl Repository {
    /// Get admin by email (case-insensitive)
    pub async fn admins_get_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    /// Get admin by ID
    pub async fn admins_get_by_id(&self, id: i64) -> AppResult<Admin> {
        sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account with id {} not found", id)))
    }

    pub async fn admins_create(&self, admin: &NewAdmin) -> AppResult<Admin> {
        let created = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (first_name, last_name, email, password_hash, role, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(admin.first_name.trim())
        .bind(admin.last_name.trim())
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(admin.role)
        .bind(AdminStatus::Active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Email already registered"))?;
        Ok(created)
    }

    /// List accounts, optionally of a single role
    pub async fn admins_list(&self, role: Option<AdminRole>) -> AppResult<Vec<Admin>> {
        let admins = sqlx::query_as::<_, Admin>(
            "SELECT * FROM admins WHERE ($1::TEXT IS NULL OR role = $1) ORDER BY first_name, last_name, id",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(admins)
    }

    /// Change the status of an account with the given role
    pub async fn admins_update_status(&self, id: i64, role: AdminRole, status: AdminStatus) -> AppResult<Admin> {
        sqlx::query_as::<_, Admin>(
            "UPDATE admins SET status = $3, updated_at = $4 WHERE id = $1 AND role = $2 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} with id {} not found", role.label(), id)))
    }

    /// Delete an account with the given role. Returns false when none matched.
    pub async fn admins_delete(&self, id: i64, role: AdminRole) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM admins WHERE id = $1 AND role = $2")
            .bind(id)
            .bind(role)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any account, back-office or library, already uses this email
    pub async fn accounts_email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM admins WHERE LOWER(email) = LOWER($1))
                OR EXISTS(SELECT 1 FROM library_credentials WHERE LOWER(email) = LOWER($1))
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
