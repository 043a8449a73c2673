//! Back-office accounts and dashboard

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    enums::{AdminRole, AdminStatus},
    library::LibraryMapPoint,
};

#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: AdminRole,
    pub status: AdminStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin account without credentials
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: AdminRole,
    pub status: AdminStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Admin> for AdminView {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            first_name: admin.first_name,
            last_name: admin.last_name,
            email: admin.email,
            role: admin.role,
            status: admin.status,
            created_at: admin.created_at,
        }
    }
}

/// Fields for a new back-office account
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: AdminRole,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateModerator {
    #[validate(length(min = 1, max = 100, message = "is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "is required"))]
    pub last_name: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, max = 255, message = "must have between 6 and 255 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateAdminStatus {
    pub status: AdminStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Dashboard {
    pub total_libraries: i64,
    pub active_libraries: i64,
    pub pending_libraries: i64,
    pub total_books: i64,
    /// Sum of copies over every collection
    pub total_copies: i64,
    pub map: Vec<LibraryMapPoint>,
}
