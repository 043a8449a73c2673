//! Data models for Localibrary

pub mod admin;
pub mod auth;
pub mod book;
pub mod enums;
pub mod library;
pub mod pagination;
pub mod upload;

// Re-export commonly used types
pub use admin::{Admin, AdminView, Dashboard};
pub use auth::Claims;
pub use book::{Book, BookDetails, BookShort, Genre};
pub use enums::{AdminRole, AdminStatus, LibraryCategory, LibraryStatus, Role, UploadKind};
pub use library::{LibraryProfile, LibraryRecord, LibrarySummary};
pub use pagination::{Page, PageQuery, PageRequest};
pub use upload::UploadResponse;
