//! Filesystem media store.
//!
//! Uploads are decoded with the `image` crate before being accepted, so a
//! stored path always refers to a well-formed image.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use image::ImageFormat;
use uuid::Uuid;

use quill_core::ports::{MediaError, MediaStore};

/// Media store rooted at a configured directory. Post images land under
/// `<root>/posts/`.
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reject anything that could escape the media root.
    fn is_safe(path: &str) -> bool {
        Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
    }

    fn extension_for(bytes: &[u8]) -> &'static str {
        match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => "png",
            Ok(ImageFormat::Jpeg) => "jpg",
            Ok(ImageFormat::Gif) => "gif",
            Ok(ImageFormat::WebP) => "webp",
            _ => "img",
        }
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn store_image(&self, original_name: &str, bytes: &[u8]) -> Result<String, MediaError> {
        // Full decode, not just a magic-byte sniff: truncated or corrupt
        // files are rejected here.
        image::load_from_memory(bytes).map_err(|e| {
            tracing::debug!(file = %original_name, error = %e, "Rejected upload: not an image");
            MediaError::NotAnImage
        })?;

        let relative = format!("posts/{}.{}", Uuid::new_v4(), Self::extension_for(bytes));
        let target = self.root.join(&relative);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MediaError::Io(e.to_string()))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;

        tracing::debug!(path = %relative, size = bytes.len(), "Stored image");
        Ok(relative)
    }

    async fn load(&self, path: &str) -> Result<Vec<u8>, MediaError> {
        if !Self::is_safe(path) {
            return Err(MediaError::NotFound);
        }

        match tokio::fs::read(self.root.join(path)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(MediaError::NotFound),
            Err(e) => Err(MediaError::Io(e.to_string())),
        }
    }
}
