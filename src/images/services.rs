use anyhow::Context;
use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, FieldError};
use crate::state::AppState;

/// Upload constraint: a single attached image, at most 1 MB, JPEG or PNG.
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;

const PRESIGN_TTL_SECS: u64 = 30 * 60;

pub struct UploadedImage {
    pub bytes: Bytes,
    pub content_type: String,
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

fn field_error(message: &str) -> FieldError {
    FieldError {
        field: "image".into(),
        message: message.into(),
    }
}

/// Checks the upload constraint and returns the file extension to store under.
pub fn validate_image(image: &UploadedImage) -> Result<&'static str, FieldError> {
    let ext = ext_from_mime(&image.content_type)
        .ok_or_else(|| field_error("Only JPEG and PNG images are allowed"))?;
    if image.bytes.len() > MAX_IMAGE_BYTES {
        return Err(field_error("Image must not exceed 1MB"));
    }
    Ok(ext)
}

/// Validates and stores an article image, returning its object key.
pub async fn store_image(st: &AppState, image: UploadedImage) -> Result<String, ApiError> {
    let ext = validate_image(&image).map_err(|e| ApiError::Validation(vec![e]))?;
    let key = format!("articles/{}.{}", Uuid::new_v4(), ext);
    st.storage
        .put(&key, image.bytes, &image.content_type)
        .await
        .with_context(|| format!("store image {}", key))?;
    Ok(key)
}

/// Presigned display URL for a stored image. Delivery is best effort: a
/// presign failure is logged and the article renders without an image.
pub async fn image_url(st: &AppState, key: Option<&str>) -> Option<String> {
    let key = key?;
    match st.storage.presign_get(key, PRESIGN_TTL_SECS).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(error = %e, key, "presign failed");
            None
        }
    }
}

/// Best-effort removal of a replaced or orphaned image object.
pub async fn remove_image(st: &AppState, key: &str) {
    if let Err(e) = st.storage.delete(key).await {
        warn!(error = %e, key, "delete image object failed");
    }
}
