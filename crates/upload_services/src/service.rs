use std::sync::Arc;

use reqwest::Url;

use crate::host::ImageHost;
use crate::types::{UploadError, UploadLimits, UploadedFile};

/// Applies the upload limits and forwards accepted images to the host.
#[derive(Clone)]
pub struct UploadService {
    host: Arc<dyn ImageHost>,
    limits: UploadLimits,
}

impl UploadService {
    /// Creates a new upload service over the given image host.
    pub fn new(host: Arc<dyn ImageHost>, limits: UploadLimits) -> Self {
        Self { host, limits }
    }

    /// The limits enforced by this service.
    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    /// Fails when a file of `size` bytes would exceed the ceiling.
    pub fn check_file_size(&self, size: usize) -> Result<(), UploadError> {
        if size > self.limits.max_file_size {
            return Err(UploadError::FileTooLarge {
                limit: self.limits.max_file_size,
            });
        }
        Ok(())
    }

    /// Fails when `count` files would exceed the per-request maximum.
    pub fn check_file_count(&self, count: usize) -> Result<(), UploadError> {
        if count > self.limits.max_files {
            return Err(UploadError::TooManyFiles {
                limit: self.limits.max_files,
            });
        }
        Ok(())
    }

    /// Stores the image at a remote URL.
    pub async fn upload_by_link(&self, link: &str) -> Result<Vec<String>, UploadError> {
        let link = link.trim();
        let url = Url::parse(link).map_err(|e| UploadError::InvalidLink(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(UploadError::InvalidLink(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }

        let stored = self.host.store_link(url.as_str()).await?;
        Ok(vec![stored])
    }

    /// Stores files received from a client, in order.
    pub async fn upload_files(&self, files: Vec<UploadedFile>) -> Result<Vec<String>, UploadError> {
        if files.is_empty() {
            return Err(UploadError::NoFiles);
        }
        self.check_file_count(files.len())?;
        for file in &files {
            self.check_file_size(file.bytes.len())?;
        }

        let mut urls = Vec::with_capacity(files.len());
        for file in files {
            urls.push(self.host.store_file(file).await?);
        }

        Ok(urls)
    }
}
