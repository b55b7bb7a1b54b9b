//! Single upload endpoint: multipart image in, hosted reference out

use axum::{Json, extract::Multipart, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Request body cap for the upload route: the image limit plus headroom
/// for multipart framing. Must exceed `MAX_UPLOAD_BYTES` or the size
/// check below can never run.
pub const MAX_BODY_BYTES: usize = MAX_UPLOAD_BYTES + 64 * 1024;

const ALLOWED_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Accept one image field and push it to the image store
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_default();

        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::Validation(
                "Only JPEG, PNG, WebP, and GIF images are accepted".to_string(),
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read upload: {}", e)))?;

        if bytes.is_empty() {
            return Err(ApiError::Validation("Uploaded file is empty".to_string()));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::Validation(
                "Uploaded file exceeds the 5 MB limit".to_string(),
            ));
        }

        let image = state.image_store.upload(bytes.to_vec(), &content_type).await?;
        info!("Image uploaded: {}", image.hosted_id);

        return Ok((
            StatusCode::CREATED,
            Json(json!({ "success": true, "data": image })),
        ));
    }

    Err(ApiError::Validation(
        "Missing 'image' field in multipart body".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_cap_leaves_room_for_the_image_limit() {
        assert!(MAX_BODY_BYTES > MAX_UPLOAD_BYTES);
    }
}
