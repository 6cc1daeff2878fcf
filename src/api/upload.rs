//! Upload API endpoints
//!
//! Multipart file uploads for the back office. Files land in the upload
//! directory under a UUID name and get a media library row.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{MediaAsset, MediaKind};

/// Build the upload router
pub fn admin_router() -> Router<AppState> {
    Router::new().route("/", post(upload_file))
}

/// POST /api/v1/admin/upload - Upload a single file
///
/// Accepts multipart/form-data with a single field named "file".
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MediaAsset>, ApiError> {
    let config = &state.upload_config;
    ensure_upload_dir(&config.path).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
    {
        if field.name().unwrap_or("") != "file" {
            continue;
        }

        let original_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !config.is_type_allowed(&content_type) {
            return Err(ApiError::validation_error(format!(
                "File type not allowed: {}",
                content_type
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation_error(format!("Failed to read file: {}", e)))?;

        if data.len() as u64 > config.max_file_size {
            return Err(ApiError::validation_error(format!(
                "File too large. Maximum size: {} MB",
                config.max_file_size / 1024 / 1024
            )));
        }

        let ext = file_extension(&original_name, &content_type);
        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let file_path = config.path.join(&filename);

        fs::write(&file_path, &data)
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to save file: {}", e)))?;

        let now = chrono::Utc::now();
        let asset = MediaAsset {
            id: 0,
            url: format!("/uploads/{}", filename),
            filename,
            kind: MediaKind::from_content_type(&content_type),
            content_type,
            size: data.len() as i64,
            alt: None,
            created_at: now,
            updated_at: now,
        };
        let stored = state.media_repo.create(&asset).await?;
        return Ok(Json(stored));
    }

    Err(ApiError::validation_error("No file provided"))
}

async fn ensure_upload_dir(path: &Path) -> Result<(), ApiError> {
    if !path.exists() {
        fs::create_dir_all(path)
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to create upload dir: {}", e)))?;
    }
    Ok(())
}

/// Pick a file extension from the uploaded name, falling back to the
/// MIME type.
fn file_extension(filename: &str, content_type: &str) -> String {
    if let Some(ext) = filename.rsplit('.').next() {
        if ext != filename && !ext.is_empty() && ext.len() < 10 {
            return ext.to_lowercase();
        }
    }

    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "video/mp4" => "mp4",
        "application/pdf" => "pdf",
        _ => "bin",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_filename() {
        assert_eq!(file_extension("photo.JPG", "image/jpeg"), "jpg");
        assert_eq!(file_extension("deck.webp", "image/webp"), "webp");
    }

    #[test]
    fn test_extension_falls_back_to_content_type() {
        assert_eq!(file_extension("noext", "image/png"), "png");
        assert_eq!(file_extension("noext", "application/x-thing"), "bin");
    }
}
