//! # Upload Services
//!
//! This crate proxies image uploads to an image host and returns the URLs
//! of the stored images. Hosts: Cloudinary, or a local directory served by
//! the API.

/// Cloudinary signed-upload client.
pub mod cloudinary;
/// The image host abstraction.
pub mod host;
/// Local directory image host.
pub mod local;
/// Upload limits and forwarding.
pub mod service;
/// Types and errors used by upload services.
pub mod types;

pub use cloudinary::{CloudinaryConfig, CloudinaryHost, SignatureAlgorithm};
pub use host::ImageHost;
pub use local::{LocalImageHost, UPLOADS_ROUTE};
pub use service::UploadService;
pub use types::{UploadError, UploadLimits, UploadedFile};
