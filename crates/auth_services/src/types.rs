use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request structure for user registration
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Name of the user
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Email address of the user
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    /// Password for the user account
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Request structure for user login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address of the user
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    /// Password for the user account
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Public information about a user, returned by register, login and profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Name of the user
    pub name: String,
    /// Email address of the user
    pub email: String,
}

/// Response structure for a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// The logged in user
    #[serde(flatten)]
    pub user: UserInfo,
    /// Bearer token, also set as the `token` cookie
    pub token: String,
}

/// User model representing the database schema
#[derive(Debug, Clone)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Name of the user
    pub name: String,
    /// Email address of the user, stored lowercase
    pub email: String,
    /// Bcrypt hash of the user's password
    pub password_hash: String,
    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Strips the password hash for API responses.
    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject of the token, the user ID
    pub sub: String,
    /// Email address of the user
    pub email: String,
    /// Expiration timestamp of the token
    pub exp: usize,
    /// Issued at timestamp of the token
    pub iat: usize,
}

/// Flags applied to the session cookie
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieSettings {
    /// Production mode: `Secure` and `SameSite=None` so the cookie crosses sites
    pub production: bool,
}

/// Custom error type for authentication-related errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The email address already exists in the system
    #[error("Email already exists")]
    EmailExists,

    /// The provided credentials are invalid
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The user was not found in the system
    #[error("User not found")]
    UserNotFound,

    /// No bearer credential was present on the request
    #[error("Missing token")]
    MissingToken,

    /// The bearer credential failed signature or expiry checks
    #[error("Invalid token")]
    InvalidToken,

    /// An internal server error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An error occurred while hashing the password
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// An error occurred while signing a token
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// An error occurred while validating input data
    #[error("Validation error: {0}")]
    Validation(String),
}

impl actix_web::ResponseError for AuthError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            AuthError::EmailExists | AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        let status = self.status_code();
        let body = match self {
            AuthError::EmailExists => serde_json::json!({
                "error": "email_exists",
                "message": "An account with this email already exists"
            }),
            AuthError::InvalidCredentials => serde_json::json!({
                "error": "invalid_credentials",
                "message": "Invalid email or password"
            }),
            AuthError::UserNotFound => serde_json::json!({
                "error": "user_not_found",
                "message": "User not found"
            }),
            AuthError::MissingToken => serde_json::json!({
                "error": "missing_token",
                "message": "Authorization token is required"
            }),
            AuthError::InvalidToken => serde_json::json!({
                "error": "invalid_token",
                "message": "Invalid or expired token"
            }),
            AuthError::Validation(msg) => serde_json::json!({
                "error": "validation_error",
                "message": msg
            }),
            other => {
                log::error!("❌ Auth request failed: {}", other);
                serde_json::json!({
                    "error": "internal_error",
                    "message": "An internal error occurred"
                })
            }
        };

        HttpResponse::build(status).json(body)
    }
}
