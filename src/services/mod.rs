//! Business logic services

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod geocoding;
pub mod libraries;
pub mod storage;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub libraries: libraries::LibrariesService,
    pub admin: admin::AdminService,
    pub storage: storage::StorageService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let geocoder = geocoding::build_geocoder(&config.geocoding)?;
        Ok(Self::with_geocoder(repository, config, geocoder))
    }

    /// Same as `new` with an explicit geocoder
    pub fn with_geocoder(repository: Repository, config: &AppConfig, geocoder: Arc<dyn geocoding::Geocoder>) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone(), geocoder.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            libraries: libraries::LibrariesService::new(repository.clone(), geocoder),
            admin: admin::AdminService::new(repository),
            storage: storage::StorageService::new(&config.upload, &config.server.public_base_url),
        }
    }
}
