//! Access tokens and login payloads

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

use super::enums::{LibraryStatus, Role};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Login email
    pub sub: String,
    /// Admin id, or library id for library accounts
    pub id: i64,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(email: &str, id: i64, role: Role, lifetime_hours: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: email.to_string(),
            id,
            role,
            exp: now + (lifetime_hours as i64) * 3600,
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    // Authorization checks

    /// Administrators and moderators
    pub fn require_staff(&self) -> Result<(), AppError> {
        match self.role {
            Role::Admin | Role::Moderator => Ok(()),
            Role::Library => Err(AppError::Authorization("Staff access required".to_string())),
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator access required".to_string()))
        }
    }

    /// A library may only act on its own data
    pub fn require_library(&self, library_id: i64) -> Result<(), AppError> {
        if self.role != Role::Library {
            return Err(AppError::Authorization("Library access required".to_string()));
        }
        if self.id != library_id {
            return Err(AppError::Authorization(
                "A library can only access its own data".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Library login joined with the library status
#[derive(Debug, Clone, FromRow)]
pub struct LibraryCredential {
    pub library_id: i64,
    pub email: String,
    pub password_hash: String,
    pub status: LibraryStatus,
}
