use actix_web::{HttpRequest, HttpResponse, Result, web};
use validator::Validate;

use auth_services::cookie::{expired_session_cookie, session_cookie};
use auth_services::jwt::JwtService;
use auth_services::middleware::{authenticate, token_from_request};
use auth_services::service::AuthService;
use auth_services::types::*;

/// Handles user registration by validating the request and creating a new
/// user. Returns the public user info.
pub async fn register(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::Validation(format!("Validation error: {}", e)))?;

    let user = auth_service.create_user(&request).await?;

    Ok(HttpResponse::Ok().json(user.info()))
}

/// Handles user login by verifying credentials, issuing a token and setting
/// it as the session cookie. The token is also returned for bearer clients.
pub async fn login(
    auth_service: web::Data<AuthService>,
    jwt_service: web::Data<JwtService>,
    cookie_settings: web::Data<CookieSettings>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::Validation(format!("Validation error: {}", e)))?;

    let user = auth_service
        .verify_password(&request.email, &request.password)
        .await?;

    let token = jwt_service.generate_token(&user)?;
    log::info!("🔑 User {} logged in", user.id);

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&token, &cookie_settings))
        .json(LoginResponse {
            user: user.info(),
            token,
        }))
}

/// Clears the session cookie.
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(expired_session_cookie())
        .json(serde_json::json!({ "ok": true }))
}

/// Returns the caller's profile, or `null` when the request carries no
/// credential at all.
pub async fn profile(
    req: HttpRequest,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    if token_from_request(&req).is_none() {
        return Ok(HttpResponse::Ok().json(serde_json::Value::Null));
    }

    let user_id = authenticate(&req)?;
    let user = auth_service
        .get_user_by_id(&user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(HttpResponse::Ok().json(user.info()))
}
