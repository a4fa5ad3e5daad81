use async_trait::async_trait;

use crate::types::{UploadError, UploadedFile};

/// An external (or local) service that stores images and hands back URLs.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Stores file bytes received from a client and returns the public URL.
    async fn store_file(&self, file: UploadedFile) -> Result<String, UploadError>;

    /// Stores the image found at `link` and returns the public URL.
    async fn store_link(&self, link: &str) -> Result<String, UploadError>;
}
