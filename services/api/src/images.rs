//! Hosted image storage backed by S3
//!
//! Product and banner images are uploaded once, stored under an opaque
//! key, and referenced everywhere else by `{hosted_id, url}` pairs.
//! Deletions are best effort: callers log failures and keep going so a
//! storage hiccup never blocks a product update.

use anyhow::Result;
use aws_sdk_s3::{Client, primitives::ByteStream};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ImageStoreConfig;

/// Reference to an image held by the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostedImage {
    /// Opaque storage key
    pub hosted_id: String,
    /// Public URL the image is served from
    pub url: String,
}

#[derive(Clone)]
pub struct ImageStore {
    s3_client: Client,
    bucket: String,
    public_url_base: String,
}

impl ImageStore {
    pub fn new(s3_client: Client, config: &ImageStoreConfig) -> Self {
        Self {
            s3_client,
            bucket: config.bucket.clone(),
            public_url_base: config.public_url_base.trim_end_matches('/').to_string(),
        }
    }

    /// Upload image bytes and return the hosted reference
    pub async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<HostedImage> {
        let extension = extension_for(content_type);
        let hosted_id = format!("images/{}.{}", Uuid::new_v4(), extension);

        info!("Uploading image to S3: {}", hosted_id);

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(&hosted_id)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await?;

        let url = format!("{}/{}", self.public_url_base, hosted_id);
        Ok(HostedImage { hosted_id, url })
    }

    /// Delete a hosted image
    pub async fn delete(&self, hosted_id: &str) -> Result<()> {
        self.s3_client
            .delete_object()
            .bucket(&self.bucket)
            .key(hosted_id)
            .send()
            .await?;

        info!("Deleted image from S3: {}", hosted_id);
        Ok(())
    }

    /// Delete several hosted images, logging failures instead of aborting
    pub async fn delete_many(&self, hosted_ids: &[String]) {
        for hosted_id in hosted_ids {
            if let Err(e) = self.delete(hosted_id).await {
                warn!("Failed to delete image {}: {}", hosted_id, e);
            }
        }
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_content_types() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/webp"), "webp");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("application/octet-stream"), "jpg");
    }

    #[test]
    fn test_hosted_image_json_shape() {
        let image = HostedImage {
            hosted_id: "images/abc.jpg".to_string(),
            url: "https://cdn.example.com/images/abc.jpg".to_string(),
        };
        let json = serde_json::to_value(&image).expect("serialize");
        assert_eq!(json["hosted_id"], "images/abc.jpg");
        assert_eq!(json["url"], "https://cdn.example.com/images/abc.jpg");
    }
}
