//! Localibrary server
//!
//! REST JSON API that helps readers find books in libraries near them in
//! São Paulo, and lets libraries manage their collections.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
