use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::config::UploadConfig;

/// Stores uploaded images under the configured images directory with
/// collision-free names.
pub struct UploadService {
    config: UploadConfig,
}

impl UploadService {
    #[must_use]
    pub const fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Write uploaded bytes to disk and return the stored filename.
    ///
    /// The original filename only contributes its extension; the stored name
    /// is a fresh UUID so concurrent uploads never clash.
    pub async fn save_image(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");

        let filename = format!("{}.{}", Uuid::new_v4(), extension);

        let images_dir = PathBuf::from(&self.config.images_path);
        if !images_dir.exists() {
            fs::create_dir_all(&images_dir).await?;
        }

        let file_path = images_dir.join(&filename);
        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write image to {}", file_path.display()))?;

        info!(path = %file_path.display(), "Stored uploaded image");

        Ok(filename)
    }

    #[must_use]
    pub fn default_product_image(&self) -> String {
        self.config.default_product_image.clone()
    }

    #[must_use]
    pub fn default_user_image(&self) -> String {
        self.config.default_user_image.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> UploadConfig {
        UploadConfig {
            images_path: std::env::temp_dir()
                .join(format!("uploads-{}", Uuid::new_v4()))
                .to_string_lossy()
                .into_owned(),
            ..UploadConfig::default()
        }
    }

    #[tokio::test]
    async fn saves_bytes_under_fresh_name() {
        let service = UploadService::new(temp_config());

        let name = service.save_image("photo.png", b"fake-bytes").await.unwrap();
        assert!(name.ends_with(".png"));

        let stored = PathBuf::from(&service.config.images_path).join(&name);
        assert_eq!(fs::read(&stored).await.unwrap(), b"fake-bytes");
    }

    #[tokio::test]
    async fn missing_extension_falls_back_to_jpg() {
        let service = UploadService::new(temp_config());

        let name = service.save_image("noext", b"x").await.unwrap();
        assert!(name.ends_with(".jpg"));
    }
}
