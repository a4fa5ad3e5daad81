use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::host::ImageHost;
use crate::types::{UploadError, UploadedFile};

/// Folder every image is stored under
pub const DEFAULT_FOLDER: &str = "hotel-booking";

/// Credentials for a Cloudinary account
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    /// Cloud name, part of the upload URL
    pub cloud_name: String,
    /// API key sent with each upload
    pub api_key: String,
    /// API secret used to sign uploads; never sent
    pub api_secret: String,
    /// Destination folder
    pub folder: String,
    /// Digest the account verifies signatures with
    pub signature_algorithm: SignatureAlgorithm,
}

/// Digest used to sign upload requests.
///
/// Cloudinary accounts verify with SHA-1 unless switched to SHA-256.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// Account default
    #[default]
    Sha1,
    /// Opt-in per account
    Sha256,
}

impl std::str::FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            other => Err(format!("unknown signature algorithm `{}`", other)),
        }
    }
}

/// Image host backed by Cloudinary's signed upload API
pub struct CloudinaryHost {
    client: Client,
    config: CloudinaryConfig,
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorResponse {
    error: CloudinaryErrorBody,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    message: String,
}

impl CloudinaryHost {
    /// Creates a new Cloudinary host
    pub fn new(config: CloudinaryConfig) -> Self {
        let upload_url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            config.cloud_name
        );

        Self {
            client: Client::new(),
            config,
            upload_url,
        }
    }

    /// Builds the signed form fields shared by both upload kinds
    fn signed_form(&self) -> Form {
        let timestamp = Utc::now().timestamp().to_string();
        let public_id = uuid::Uuid::new_v4().simple().to_string();

        let mut params = BTreeMap::new();
        params.insert("folder", self.config.folder.clone());
        params.insert("public_id", public_id);
        params.insert("timestamp", timestamp);

        let algorithm = self.config.signature_algorithm;
        let signature = sign_params(&params, &self.config.api_secret, algorithm);

        let mut form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        if algorithm == SignatureAlgorithm::Sha256 {
            form = form.text("signature_algorithm", "sha256");
        }
        for (key, value) in params {
            form = form.text(key, value);
        }
        form
    }

    async fn send(&self, form: Form) -> Result<String, UploadError> {
        let response = self.client.post(&self.upload_url).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = match response.json::<CloudinaryErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("HTTP {}", status),
            };
            warn!("Cloudinary rejected upload: {}", message);
            return Err(UploadError::Host(message));
        }

        let body: CloudinaryUploadResponse = response.json().await?;
        body.secure_url
            .or(body.url)
            .ok_or_else(|| UploadError::Host("Response carried no URL".to_string()))
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn store_file(&self, file: UploadedFile) -> Result<String, UploadError> {
        let extension = file.extension();
        let file_name = file
            .file_name
            .clone()
            .unwrap_or_else(|| format!("upload.{}", extension));

        let mut part = Part::bytes(file.bytes).file_name(file_name);
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let url = self.send(self.signed_form().part("file", part)).await?;
        info!("Stored upload on Cloudinary: {}", url);
        Ok(url)
    }

    async fn store_link(&self, link: &str) -> Result<String, UploadError> {
        // Cloudinary fetches remote URLs itself
        let url = self
            .send(self.signed_form().text("file", link.to_string()))
            .await?;
        info!("Stored {} on Cloudinary: {}", link, url);
        Ok(url)
    }
}

/// Signs upload parameters: `k1=v1&k2=v2...` in key order, followed by the
/// secret, hashed with `algorithm` and hex encoded. Empty values are skipped.
pub fn sign_params(
    params: &BTreeMap<&str, String>,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    match algorithm {
        SignatureAlgorithm::Sha1 => hex_digest::<Sha1>(&to_sign, api_secret),
        SignatureAlgorithm::Sha256 => hex_digest::<Sha256>(&to_sign, api_secret),
    }
}

fn hex_digest<D: Digest>(to_sign: &str, api_secret: &str) -> String {
    let mut hasher = D::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());

    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&'static str, &str)]) -> BTreeMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn sha1_signature_matches_cloudinary_reference() {
        // Worked example from Cloudinary's upload signature documentation
        let signed = params(&[
            ("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop"),
            ("public_id", "sample_image"),
            ("timestamp", "1315060510"),
        ]);

        assert_eq!(
            sign_params(&signed, "abcd", SignatureAlgorithm::Sha1),
            "bfd09f95f331f558cbd1320e67aa8d488770583e"
        );
    }

    #[test]
    fn sha256_signature_is_hex() {
        let signature = sign_params(
            &params(&[("timestamp", "1700000000")]),
            "secret",
            SignatureAlgorithm::Sha256,
        );

        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn algorithm_parses_case_insensitively() {
        assert_eq!("SHA1".parse::<SignatureAlgorithm>(), Ok(SignatureAlgorithm::Sha1));
        assert_eq!("sha256".parse::<SignatureAlgorithm>(), Ok(SignatureAlgorithm::Sha256));
        assert!("md5".parse::<SignatureAlgorithm>().is_err());
        assert_eq!(SignatureAlgorithm::default(), SignatureAlgorithm::Sha1);
    }

    #[test]
    fn signature_depends_on_secret_and_values() {
        let base = params(&[("folder", "hotel-booking"), ("timestamp", "1")]);
        let other_time = params(&[("folder", "hotel-booking"), ("timestamp", "2")]);
        let sha1 = SignatureAlgorithm::Sha1;

        assert_ne!(sign_params(&base, "a", sha1), sign_params(&base, "b", sha1));
        assert_ne!(sign_params(&base, "a", sha1), sign_params(&other_time, "a", sha1));
    }

    #[test]
    fn empty_values_do_not_change_the_signature() {
        let without = params(&[("timestamp", "1")]);
        let with_empty = params(&[("folder", ""), ("timestamp", "1")]);
        let sha1 = SignatureAlgorithm::Sha1;

        assert_eq!(sign_params(&without, "s", sha1), sign_params(&with_empty, "s", sha1));
    }
}
