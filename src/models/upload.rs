//! Uploaded image metadata

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::UploadKind;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Absolute URL the image is served from
    pub url: String,
    /// Path relative to the upload root, e.g. `covers/<uuid>.jpg`
    pub path: String,
    pub kind: UploadKind,
    /// Final dimensions, e.g. `600x800px`
    pub size: String,
}
