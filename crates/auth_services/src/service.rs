use std::sync::Arc;

use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::Utc;
use uuid::Uuid;

use crate::repository::UserRepository;
use crate::types::{AuthError, RegisterRequest, User};

/// A service for handling user authentication operations such as creating
/// users, retrieving user information and verifying credentials.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hash_cost: u32,
}

impl AuthService {
    /// Creates a new instance of `AuthService` over the given user storage.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            hash_cost: DEFAULT_COST,
        }
    }

    /// Overrides the bcrypt cost factor.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Creates a new user from a registration request.
    pub async fn create_user(&self, request: &RegisterRequest) -> Result<User, AuthError> {
        let email = normalize_email(&request.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let password_hash = hash(&request.password, self.hash_cost)?;

        let user = User {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email,
            password_hash,
            created_at: Utc::now(),
        };

        let user = self.users.insert(user).await?;
        log::info!("👤 Registered user {}", user.id);

        Ok(user)
    }

    /// Retrieves a user by their email address, returning `None` if not found.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        self.users.find_by_email(&normalize_email(email)).await
    }

    /// Retrieves a user by their ID, returning `None` if not found.
    pub async fn get_user_by_id(&self, user_id: &Uuid) -> Result<Option<User>, AuthError> {
        self.users.find_by_id(user_id).await
    }

    /// Verifies the user's password against the stored hash.
    ///
    /// An unknown email is `UserNotFound`; a known user with a wrong password
    /// is always `InvalidCredentials`.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
