use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use tracing::{debug, info};
use uuid::Uuid;

use crate::host::ImageHost;
use crate::types::{UploadError, UploadedFile};

/// Route the server mounts the upload directory under.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Image host that writes files into a local directory served by the API
/// itself under [`UPLOADS_ROUTE`].
pub struct LocalImageHost {
    client: Client,
    root: PathBuf,
    public_base: String,
    max_file_size: usize,
}

impl LocalImageHost {
    /// Creates the upload directory if needed.
    ///
    /// Returned URLs are `{public_base}/uploads/{file}`; an empty base gives
    /// root-relative URLs.
    pub fn new(
        root: impl Into<PathBuf>,
        public_base: &str,
        max_file_size: usize,
    ) -> Result<Self, UploadError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        Ok(Self {
            client: Client::new(),
            root,
            public_base: public_base.trim_end_matches('/').to_string(),
            max_file_size,
        })
    }

    /// Directory the files are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn download(&self, link: &str) -> Result<UploadedFile, UploadError> {
        let mut response = self.client.get(link).send().await?;

        if !response.status().is_success() {
            return Err(UploadError::Host(format!(
                "Fetching {} returned HTTP {}",
                link,
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_file_size as u64 {
                return Err(UploadError::FileTooLarge {
                    limit: self.max_file_size,
                });
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > self.max_file_size {
                return Err(UploadError::FileTooLarge {
                    limit: self.max_file_size,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        let file_name = response
            .url()
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        debug!("Downloaded {} bytes from {}", bytes.len(), link);

        Ok(UploadedFile {
            file_name,
            content_type,
            bytes,
        })
    }
}

#[async_trait]
impl ImageHost for LocalImageHost {
    async fn store_file(&self, file: UploadedFile) -> Result<String, UploadError> {
        let name = format!("{}.{}", Uuid::new_v4().simple(), file.extension());
        tokio::fs::write(self.root.join(&name), &file.bytes).await?;

        info!("Stored upload {} ({} bytes)", name, file.bytes.len());
        Ok(format!("{}{}/{}", self.public_base, UPLOADS_ROUTE, name))
    }

    async fn store_link(&self, link: &str) -> Result<String, UploadError> {
        let file = self.download(link).await?;
        self.store_file(file).await
    }
}
