//! Image upload endpoint

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Multipart;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{enums::UploadKind, upload::UploadResponse},
    AppState,
};

use super::AuthenticatedUser;

/// Name of the multipart field carrying the image
const FILE_FIELD: &str = "file";

/// Multipart form accepted by the upload endpoint
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// JPEG or PNG image
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Upload a JPEG or PNG image, resized for its kind
#[utoipa::path(
    post,
    path = "/uploads/{kind}",
    tag = "uploads",
    security(("bearer_auth" = [])),
    params(
        ("kind" = String, Path, description = "cover, author or library")
    ),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Missing, invalid or unsupported file", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 413, description = "File too large", body = crate::error::ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(kind): Path<String>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let kind: UploadKind = kind.parse().map_err(AppError::BadRequest)?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let data = field.bytes().await.map_err(multipart_error)?;

        tracing::debug!("{} {} uploads a {} image", claims.role, claims.id, kind);

        let stored = state
            .services
            .storage
            .store(kind, file_name.as_deref(), content_type.as_deref(), data.to_vec())
            .await?;
        return Ok((StatusCode::CREATED, Json(stored)));
    }

    Err(AppError::BadRequest(format!("Missing '{}' field", FILE_FIELD)))
}

fn multipart_error(err: axum_extra::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File exceeds the maximum upload size".to_string())
    } else {
        AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}
