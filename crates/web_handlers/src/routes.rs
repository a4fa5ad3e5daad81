use actix_web::{HttpResponse, error::InternalError, web};

use auth_services::middleware::AuthMiddleware;
use auth_services::types::AuthError;

use crate::auth_handlers::*;
use crate::booking_handlers::*;
use crate::health_handlers::*;
use crate::place_handlers::*;
use crate::upload_handlers::*;

/// JSON body extraction that answers malformed bodies in the API's error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        log::warn!("⚠️ Rejected request body: {}", message);
        InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid_body",
                "message": message
            })),
        )
        .into()
    })
}

/// JSON body extraction for account forms: unreadable bodies are invalid
/// input and answer 422 like any other registration or login mistake.
pub fn account_json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("⚠️ Rejected account form: {}", err);
        AuthError::Validation(format!("Validation error: {}", err)).into()
    })
}

/// Path extraction that answers unparseable ids with a JSON 404.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        InternalError::from_response(
            err,
            HttpResponse::NotFound().json(serde_json::json!({
                "error": "not_found",
                "message": "Resource not found"
            })),
        )
        .into()
    })
}

/// Registers every API route.
///
/// Expects `AuthService`, `JwtService`, `CookieSettings`, `PlaceService`,
/// `BookingService` and `UploadService` as `web::Data`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .route("/", web::get().to(root))
        .route("/health", web::get().to(health))
        .service(
            web::scope("/api")
                .route("/test", web::get().to(api_test))
                // Accounts
                .service(
                    web::resource("/register")
                        .app_data(account_json_config())
                        .route(web::post().to(register)),
                )
                .service(
                    web::resource("/login")
                        .app_data(account_json_config())
                        .route(web::post().to(login)),
                )
                .route("/logout", web::post().to(logout))
                .route("/profile", web::get().to(profile))
                // Places: reads are public, writes authenticate through the extractor
                .route("/places", web::get().to(list_places))
                .route("/places", web::post().to(create_place))
                .route("/places", web::put().to(update_place))
                .route("/places/{id}", web::get().to(get_place))
                .service(
                    web::resource("/user-places")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(user_places)),
                )
                // Bookings
                .service(
                    web::resource("/bookings")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(list_bookings))
                        .route(web::post().to(create_booking)),
                )
                // Uploads
                .route("/upload-by-link", web::post().to(upload_by_link))
                .route("/upload", web::post().to(upload_photos)),
        );
}
