use thiserror::Error;

use upload_services::{CloudinaryConfig, SignatureAlgorithm};
use upload_services::cloudinary::DEFAULT_FOLDER;
use upload_services::types::DEFAULT_MAX_FILE_SIZE;

const DEV_JWT_SECRET: &str = "dev-secret-change-me";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 168;
const DEFAULT_ORIGIN_SUFFIX: &str = ".netlify.app";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

/// Errors raised while reading the server configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Everything the server reads from its environment at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,
    /// Lifetime of issued tokens; always positive
    pub token_ttl: chrono::Duration,
    pub frontend_url: Option<String>,
    pub allowed_origin_suffix: String,
    /// Set only when all three Cloudinary variables are present
    pub cloudinary: Option<CloudinaryConfig>,
    pub upload_dir: String,
    pub public_url: String,
    pub max_upload_bytes: usize,
    pub host: String,
    pub port: u16,
    pub production: bool,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            log::warn!("⚠️ JWT_SECRET not set, using an insecure development secret");
            DEV_JWT_SECRET.to_string()
        });

        let signature_algorithm =
            parse_or(&get, "CLOUDINARY_SIGNATURE_ALGORITHM", SignatureAlgorithm::Sha1)?;
        let cloudinary = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
                folder: DEFAULT_FOLDER.to_string(),
                signature_algorithm,
            }),
            _ => None,
        };

        let production = ["APP_ENV", "NODE_ENV"]
            .iter()
            .any(|name| get(name).is_some_and(|v| v.eq_ignore_ascii_case("production")));

        let ttl_hours: i64 = parse_or(&get, "TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        let token_ttl = chrono::Duration::try_hours(ttl_hours)
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .ok_or_else(|| ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                value: ttl_hours.to_string(),
            })?;

        Ok(Self {
            database_url,
            jwt_secret,
            token_ttl,
            frontend_url: get("FRONTEND_URL").map(|url| url.trim_end_matches('/').to_string()),
            allowed_origin_suffix: get("ALLOWED_ORIGIN_SUFFIX")
                .unwrap_or_else(|| DEFAULT_ORIGIN_SUFFIX.to_string()),
            cloudinary,
            upload_dir: get("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            public_url: get("PUBLIC_URL").unwrap_or_default(),
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", DEFAULT_MAX_FILE_SIZE)?,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            production,
        })
    }

    /// Address to bind, as `host:port`
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
