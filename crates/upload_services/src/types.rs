use serde::{Deserialize, Serialize};

/// Default per-file ceiling: 5 MiB.
pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Default number of files accepted by one multipart upload.
pub const DEFAULT_MAX_FILES: usize = 100;

/// Limits applied to every upload
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// Largest accepted file, in bytes
    pub max_file_size: usize,
    /// Most files accepted in one request
    pub max_files: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

/// A file received from a client, fully buffered
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name, if the client sent one
    pub file_name: Option<String>,
    /// MIME type, if the client sent one
    pub content_type: Option<String>,
    /// File contents
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// File extension derived from the MIME type, falling back to the file name.
    pub fn extension(&self) -> String {
        extension_for(self.content_type.as_deref(), self.file_name.as_deref())
    }
}

/// Picks a file extension from a MIME type (`image/png` → `png`) or a file name.
pub fn extension_for(content_type: Option<&str>, file_name: Option<&str>) -> String {
    let from_mime = content_type
        .and_then(|ct| ct.split(';').next())
        .and_then(|ct| ct.trim().strip_prefix("image/"))
        .map(|sub| match sub {
            "jpeg" | "pjpeg" => "jpg",
            "svg+xml" => "svg",
            other => other,
        });

    let from_name = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext);

    from_mime
        .or(from_name)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}

/// Request structure for `POST /api/upload-by-link`
#[derive(Debug, Deserialize)]
pub struct UploadByLinkRequest {
    /// Remote image URL
    pub link: String,
}

/// Response structure for both upload endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// URLs of the stored images, in upload order
    pub urls: Vec<String>,
}

/// Custom error type for upload operations
#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    /// A file exceeded the size ceiling
    #[error("File exceeds the {limit} byte limit")]
    FileTooLarge {
        /// The ceiling that was exceeded
        limit: usize,
    },

    /// More files than allowed in one request
    #[error("At most {limit} files may be uploaded at once")]
    TooManyFiles {
        /// The file count ceiling
        limit: usize,
    },

    /// The request carried no files
    #[error("No files were uploaded")]
    NoFiles,

    /// The link is not an absolute http(s) URL
    #[error("Invalid link: {0}")]
    InvalidLink(String),

    /// The multipart body could not be read
    #[error("Malformed upload: {0}")]
    Multipart(String),

    /// The image host rejected or failed the upload
    #[error("Image host error: {0}")]
    Host(String),

    /// HTTP error while talking to the image host or the remote link
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Local storage error
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl actix_web::ResponseError for UploadError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            UploadError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::TooManyFiles { .. }
            | UploadError::NoFiles
            | UploadError::InvalidLink(_)
            | UploadError::Multipart(_) => StatusCode::BAD_REQUEST,
            UploadError::Host(_) | UploadError::Network(_) => StatusCode::BAD_GATEWAY,
            UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        let (code, message) = match self {
            UploadError::FileTooLarge { .. } => ("file_too_large", self.to_string()),
            UploadError::TooManyFiles { .. } => ("too_many_files", self.to_string()),
            UploadError::NoFiles => ("no_files", self.to_string()),
            UploadError::InvalidLink(_) => ("invalid_link", self.to_string()),
            UploadError::Multipart(_) => ("malformed_upload", self.to_string()),
            UploadError::Host(_) | UploadError::Network(_) => {
                log::error!("❌ Upload failed: {}", self);
                ("upload_failed", "Upload failed".to_string())
            }
            UploadError::Io(_) => {
                log::error!("❌ Upload failed: {}", self);
                ("internal_error", "An internal error occurred".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": code,
            "message": message
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_prefers_mime_type() {
        assert_eq!(extension_for(Some("image/jpeg"), Some("x.png")), "jpg");
        assert_eq!(extension_for(Some("image/webp; q=1"), None), "webp");
    }

    #[test]
    fn extension_falls_back_to_file_name_then_bin() {
        assert_eq!(extension_for(Some("application/octet-stream"), Some("Beach.PNG")), "png");
        assert_eq!(extension_for(None, Some("no-extension")), "bin");
        assert_eq!(extension_for(None, Some("evil.p/hp")), "bin");
        assert_eq!(extension_for(None, None), "bin");
    }
}
