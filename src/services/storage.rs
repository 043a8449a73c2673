//! Image uploads: checks, resizing and local storage

use std::path::{Path, PathBuf};

use image::{imageops::FilterType, DynamicImage, ImageFormat};
use uuid::Uuid;

use crate::{
    config::UploadConfig,
    error::{AppError, AppResult},
    models::{enums::UploadKind, upload::UploadResponse},
};

/// Mount point of the stored files, outside the API prefix
pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
    public_base_url: String,
    max_file_size: usize,
}

impl StorageService {
    pub fn new(config: &UploadConfig, public_base_url: &str) -> Self {
        Self {
            root: PathBuf::from(&config.dir),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_file_size: config.max_file_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Create one directory per upload kind
    pub async fn ensure_directories(&self) -> AppResult<()> {
        for kind in UploadKind::ALL {
            let dir = self.root.join(kind.directory());
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| AppError::Internal(format!("Cannot create {}: {}", dir.display(), e)))?;
        }
        Ok(())
    }

    /// Check, resize and write an uploaded image
    pub async fn store(
        &self,
        kind: UploadKind,
        file_name: Option<&str>,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> AppResult<UploadResponse> {
        let format = check_upload(file_name, content_type, data.len(), self.max_file_size)?;

        let relative = format!("{}/{}.{}", kind.directory(), Uuid::new_v4(), extension(format));
        let destination = self.root.join(&relative);
        let (width, height) = kind.dimensions();

        let (final_width, final_height) =
            tokio::task::spawn_blocking(move || resize_and_save(&data, format, width, height, &destination))
                .await
                .map_err(|e| AppError::Internal(format!("Image task failed: {}", e)))??;

        tracing::info!("Stored {} image {} ({}x{})", kind, relative, final_width, final_height);

        Ok(UploadResponse {
            url: format!("{}{}/{}", self.public_base_url, UPLOADS_ROUTE, relative),
            path: relative,
            kind,
            size: format!("{}x{}px", final_width, final_height),
        })
    }
}

/// Upload rules, checked before any decoding
fn check_upload(
    file_name: Option<&str>,
    content_type: Option<&str>,
    size: usize,
    max_file_size: usize,
) -> AppResult<ImageFormat> {
    if size == 0 {
        return Err(AppError::BadRequest("File is empty".to_string()));
    }
    if size > max_file_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File exceeds the maximum size of {} MB",
            max_file_size / (1024 * 1024)
        )));
    }
    if file_name.is_some_and(|name| name.contains("..")) {
        return Err(AppError::BadRequest("Invalid file name".to_string()));
    }

    match content_type.map(|c| c.trim().to_ascii_lowercase()).as_deref() {
        Some("image/jpeg") | Some("image/jpg") => Ok(ImageFormat::Jpeg),
        Some("image/png") => Ok(ImageFormat::Png),
        _ => Err(AppError::BadRequest("Only JPEG and PNG images are accepted".to_string())),
    }
}

fn extension(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "png",
        _ => "jpg",
    }
}

/// Scale into the (width, height) box keeping the aspect ratio
fn resize_and_save(data: &[u8], format: ImageFormat, width: u32, height: u32, path: &Path) -> AppResult<(u32, u32)> {
    let decoded = image::load_from_memory(data)
        .map_err(|e| AppError::BadRequest(format!("Invalid image file: {}", e)))?;

    let resized = fit_within(&decoded, width, height);
    let output = match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
        _ => resized,
    };

    output
        .save_with_format(path, format)
        .map_err(|e| AppError::Internal(format!("Failed to save image: {}", e)))?;

    Ok((output.width(), output.height()))
}

fn fit_within(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    image.resize(width, height, FilterType::Lanczos3)
}
