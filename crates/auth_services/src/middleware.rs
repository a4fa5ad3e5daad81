use actix_web::{
    Error, HttpMessage, HttpRequest, ResponseError, Result,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::AUTHORIZATION,
    web,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{Ready, ready},
    rc::Rc,
};
use uuid::Uuid;

use crate::cookie::SESSION_COOKIE;
use crate::jwt::JwtService;
use crate::types::AuthError;

/// Middleware that rejects requests without a valid credential and stores
/// the caller's id in the request extensions.
///
/// Reads the [`JwtService`] registered as `web::Data` on the app.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

/// Service that implements the authentication middleware logic
pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let user_id = match authenticate(req.request()) {
                Ok(user_id) => user_id,
                Err(err) => {
                    log::warn!("🔒 Rejected {} {}: {}", req.method(), req.path(), err);
                    let response = err.error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            req.extensions_mut().insert(user_id);

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Locates the bearer credential: the session cookie first, then an
/// `Authorization: Bearer` header.
pub fn token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Verifies the request's credential and returns the caller's id.
pub fn authenticate(req: &HttpRequest) -> Result<Uuid, AuthError> {
    let token = token_from_request(req).ok_or(AuthError::MissingToken)?;

    let jwt_service = req.app_data::<web::Data<JwtService>>().ok_or_else(|| {
        log::error!("❌ JwtService is not registered as app data");
        AuthError::InvalidToken
    })?;

    jwt_service.extract_user_id_from_token(&token)
}

/// Custom extractor for the authenticated user ID.
///
/// Uses the id stored by [`AuthMiddleware`] when present, otherwise verifies
/// the credential itself, so it also works on routes without the middleware.
pub struct AuthenticatedUser(pub Uuid);

impl actix_web::FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        if let Some(id) = req.extensions().get::<Uuid>().copied() {
            return ready(Ok(AuthenticatedUser(id)));
        }

        ready(authenticate(req).map(AuthenticatedUser))
    }
}
