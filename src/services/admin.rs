//! Back-office: dashboard, library moderation and moderator accounts

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        admin::{AdminView, CreateModerator, Dashboard, NewAdmin},
        enums::{AdminRole, AdminStatus, LibraryStatus},
        library::LibraryProfile,
        pagination::{Page, PageRequest},
    },
    repository::Repository,
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct AdminService {
    repository: Repository,
}

impl AdminService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn dashboard(&self) -> AppResult<Dashboard> {
        Ok(Dashboard {
            total_libraries: self.repository.libraries_count(None).await?,
            active_libraries: self.repository.libraries_count(Some(LibraryStatus::Active)).await?,
            pending_libraries: self.repository.libraries_count(Some(LibraryStatus::Pending)).await?,
            total_books: self.repository.books_count().await?,
            total_copies: self.repository.collection_total_copies().await?,
            map: self.repository.libraries_map_points().await?,
        })
    }

    /// Every library, any city, optionally of one status
    pub async fn list_libraries(
        &self,
        status: Option<LibraryStatus>,
        page: &PageRequest,
    ) -> AppResult<Page<LibraryProfile>> {
        let (rows, total) = self.repository.libraries_list(status, None, page).await?;
        Ok(Page::new(rows.iter().map(LibraryProfile::from).collect(), page, total))
    }

    pub async fn update_library_status(&self, id: i64, status: LibraryStatus) -> AppResult<LibraryProfile> {
        let updated = self.repository.libraries_update_status(id, status).await?;
        tracing::info!("Library {} is now {}", id, status);
        Ok(updated.into())
    }

    pub async fn delete_library(&self, id: i64) -> AppResult<()> {
        self.repository.libraries_delete(id).await?;
        tracing::info!("Library {} deleted", id);
        Ok(())
    }

    // Moderators

    pub async fn create_moderator(&self, request: CreateModerator) -> AppResult<AdminView> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        if self.repository.accounts_email_exists(&email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let moderator = self
            .repository
            .admins_create(&NewAdmin {
                first_name: request.first_name,
                last_name: request.last_name,
                email,
                password_hash: hash_password(&request.password)?,
                role: AdminRole::Moderator,
            })
            .await?;

        tracing::info!("Moderator {} created", moderator.id);
        Ok(moderator.into())
    }

    pub async fn list_moderators(&self) -> AppResult<Vec<AdminView>> {
        let moderators = self.repository.admins_list(Some(AdminRole::Moderator)).await?;
        Ok(moderators.into_iter().map(AdminView::from).collect())
    }

    pub async fn update_moderator_status(&self, id: i64, status: AdminStatus) -> AppResult<AdminView> {
        let moderator = self
            .repository
            .admins_update_status(id, AdminRole::Moderator, status)
            .await?;
        tracing::info!("Moderator {} is now {}", id, status);
        Ok(moderator.into())
    }

    pub async fn delete_moderator(&self, id: i64) -> AppResult<()> {
        if !self.repository.admins_delete(id, AdminRole::Moderator).await? {
            return Err(AppError::NotFound(format!("Moderator with id {} not found", id)));
        }
        tracing::info!("Moderator {} deleted", id);
        Ok(())
    }
}
