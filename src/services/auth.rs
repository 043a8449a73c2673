//! Login, library registration and password hashing

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        admin::NewAdmin,
        auth::{Claims, LoginRequest, LoginResponse},
        enums::{AdminRole, AdminStatus, LibraryStatus, Role},
        library::{LibraryProfile, NewLibrary, RegisterLibrary},
    },
    repository::Repository,
    services::{geocoding::Geocoder, libraries::resolve_address},
    validation::{self, ensure},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    geocoder: Arc<dyn Geocoder>,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            repository,
            config,
            geocoder,
        }
    }

    /// Authenticate an admin, moderator or library and issue a JWT
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        request.validate()?;
        let email = request.email.trim().to_lowercase();

        if let Some(admin) = self.repository.admins_get_by_email(&email).await? {
            if !verify_password(&admin.password_hash, &request.password)? {
                return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
            }
            if admin.status == AdminStatus::Inactive {
                return Err(AppError::Authorization("Account is inactive".to_string()));
            }
            tracing::info!("{} {} logged in", admin.role, admin.email);
            return self.issue_token(&admin.email, admin.id, admin.role.into());
        }

        let credential = self
            .repository
            .credentials_get_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Authentication(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&credential.password_hash, &request.password)? {
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }
        if credential.status == LibraryStatus::Inactive {
            return Err(AppError::Authorization("Library is inactive".to_string()));
        }

        tracing::info!("Library {} logged in", credential.library_id);
        self.issue_token(&credential.email, credential.library_id, Role::Library)
    }

    fn issue_token(&self, email: &str, id: i64, role: Role) -> AppResult<LoginResponse> {
        let claims = Claims::new(email, id, role, self.config.jwt_expiration_hours);
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: claims.exp - claims.iat,
        })
    }

    /// Register a library; it starts out PENDING until staff approve it
    pub async fn register_library(&self, request: RegisterLibrary) -> AppResult<LibraryProfile> {
        request.validate()?;

        ensure(validation::is_valid_email(request.email.trim()), "Invalid email")?;
        ensure(validation::is_valid_cnpj(request.cnpj.trim()), "Invalid CNPJ")?;
        ensure(validation::is_valid_cep(request.address.cep.trim()), "Invalid CEP")?;
        ensure(
            validation::is_valid_password(&request.password),
            "Password must have between 6 and 255 characters",
        )?;
        let phone = non_blank(request.phone.as_deref());
        if let Some(phone) = phone {
            ensure(validation::is_valid_phone(phone), "Invalid phone")?;
        }
        let website = non_blank(request.website.as_deref());
        if let Some(website) = website {
            ensure(validation::is_valid_website(website), "Invalid website")?;
        }

        let email = request.email.trim().to_lowercase();
        let cnpj = validation::sanitize_digits(&request.cnpj);

        if self.repository.accounts_email_exists(&email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if self.repository.libraries_cnpj_exists(&cnpj, None).await? {
            return Err(AppError::Conflict("CNPJ already registered".to_string()));
        }

        let address = resolve_address(self.geocoder.as_ref(), request.address).await?;

        let library = NewLibrary {
            trade_name: request.trade_name.trim().to_string(),
            legal_name: request.legal_name.trim().to_string(),
            cnpj,
            phone: phone.map(validation::sanitize_digits),
            category: request.category,
            website: website.map(String::from),
            email,
            password_hash: hash_password(&request.password)?,
            address,
        };

        let created = self.repository.libraries_create(&library).await?;
        tracing::info!("Library {} registered, pending approval", created.id);

        Ok(created.into())
    }

    /// Create the configured first administrator if it does not exist yet
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        let (Some(email), Some(password)) = (
            self.config.bootstrap_admin_email.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(());
        };

        let email = email.trim().to_lowercase();
        if self.repository.admins_get_by_email(&email).await?.is_some() {
            return Ok(());
        }

        ensure(validation::is_valid_email(&email), "Invalid bootstrap admin email")?;
        ensure(
            validation::is_valid_password(password),
            "Bootstrap admin password must have between 6 and 255 characters",
        )?;

        let admin = self
            .repository
            .admins_create(&NewAdmin {
                first_name: "Admin".to_string(),
                last_name: "Localibrary".to_string(),
                email,
                password_hash: hash_password(password)?,
                role: AdminRole::Admin,
            })
            .await?;

        tracing::info!("Bootstrap administrator {} created", admin.email);
        Ok(())
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("segredo123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "segredo123").unwrap());
        assert!(!verify_password(&hash, "segredo124").unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("segredo123").unwrap(), hash_password("segredo123").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        assert!(matches!(verify_password("plain", "x"), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  (11) 3333-4444 ")), Some("(11) 3333-4444"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
