use async_trait::async_trait;

/// Media storage - validated image uploads kept under a configured root
/// and served back by relative path.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Validate that `bytes` is a well-formed image and persist it.
    /// Returns the relative path the image is now addressable under.
    async fn store_image(&self, original_name: &str, bytes: &[u8]) -> Result<String, MediaError>;

    /// Load stored bytes by relative path.
    async fn load(&self, path: &str) -> Result<Vec<u8>, MediaError>;
}

/// Media storage errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Upload is not a well-formed image")]
    NotAnImage,

    #[error("Media not found")]
    NotFound,

    #[error("I/O failure: {0}")]
    Io(String),
}
