use actix_web::cookie::{Cookie, SameSite, time::OffsetDateTime};

use crate::types::CookieSettings;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Builds the HttpOnly cookie set at login.
///
/// In production the cookie is `Secure` with `SameSite=None` so a frontend
/// on another origin can send it; otherwise `SameSite=Lax`.
pub fn session_cookie(token: &str, settings: &CookieSettings) -> Cookie<'static> {
    let same_site = if settings.production {
        SameSite::None
    } else {
        SameSite::Lax
    };

    Cookie::build(SESSION_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .secure(settings.production)
        .same_site(same_site)
        .finish()
}

/// Builds an empty cookie that expired at the epoch, clearing the session.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .expires(OffsetDateTime::UNIX_EPOCH)
        .finish()
}
