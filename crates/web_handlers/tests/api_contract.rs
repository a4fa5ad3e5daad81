use std::path::PathBuf;
use std::sync::Arc;

use actix_files::Files;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use auth_services::jwt::JwtService;
use auth_services::repository::InMemoryUserRepository;
use auth_services::service::AuthService;
use auth_services::types::CookieSettings;
use listing_services::{BookingService, InMemoryBookingRepository, InMemoryPlaceRepository, PlaceService};
use upload_services::{LocalImageHost, UPLOADS_ROUTE, UploadLimits, UploadService};
use web_handlers::configure_api;

const MAX_FILE_SIZE: usize = 64;
const BOUNDARY: &str = "stayhub-test-boundary";

/// Everything an app instance needs, backed by in-memory stores.
struct TestState {
    auth: web::Data<AuthService>,
    jwt: web::Data<JwtService>,
    cookies: web::Data<CookieSettings>,
    places: web::Data<PlaceService>,
    bookings: web::Data<BookingService>,
    uploads: web::Data<UploadService>,
    upload_dir: PathBuf,
}

impl TestState {
    fn new() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let places = Arc::new(InMemoryPlaceRepository::new());
        let bookings = Arc::new(InMemoryBookingRepository::new());

        let upload_dir = std::env::temp_dir().join(format!("stayhub-uploads-{}", uuid::Uuid::new_v4()));
        let host = LocalImageHost::new(&upload_dir, "", MAX_FILE_SIZE).expect("upload dir");
        let limits = UploadLimits {
            max_file_size: MAX_FILE_SIZE,
            max_files: 3,
        };

        Self {
            auth: web::Data::new(AuthService::new(users).with_hash_cost(4)),
            jwt: web::Data::new(JwtService::new("test-secret", chrono::Duration::hours(1))),
            cookies: web::Data::new(CookieSettings { production: false }),
            places: web::Data::new(PlaceService::new(places.clone())),
            bookings: web::Data::new(BookingService::new(bookings, places)),
            uploads: web::Data::new(UploadService::new(Arc::new(host), limits)),
            upload_dir,
        }
    }

    fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone())
            .app_data(self.jwt.clone())
            .app_data(self.cookies.clone())
            .app_data(self.places.clone())
            .app_data(self.bookings.clone())
            .app_data(self.uploads.clone())
            .service(Files::new(UPLOADS_ROUTE, &self.upload_dir))
            .configure(configure_api);
    }
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(App::new().configure(|cfg| $state.configure(cfg))).await
    };
}

macro_rules! register {
    ($app:expr, $name:expr, $email:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/register")
            .set_json(json!({ "name": $name, "email": $email, "password": $password }))
            .to_request();
        test::call_service(&$app, req).await
    }};
}

/// Registers and logs in, evaluating to the session token.
macro_rules! sign_up {
    ($app:expr, $email:expr) => {{
        let resp = register!($app, "Guest", $email, "secret1");
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": $email, "password": "secret1" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["token"].as_str().expect("token in login body").to_string()
    }};
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", token))
}

fn place_body() -> Value {
    json!({
        "title": "Cabin by the lake",
        "address": "1 Shore Rd",
        "addedPhotos": ["https://img.example/cabin.jpg"],
        "description": "Quiet",
        "perks": ["wifi", "parking"],
        "extraInfo": "No pets",
        "checkIn": "14",
        "checkOut": "11",
        "maxGuests": "4",
        "price": 120
    })
}

fn multipart_body(files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, file_name, bytes) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

#[actix_web::test]
async fn liveness_routes_answer() {
    let state = TestState::new();
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/test").to_request()).await;
    assert_eq!(body, json!({ "ok": true }));

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn duplicate_registration_is_rejected() {
    let state = TestState::new();
    let app = app!(state);

    let first = register!(app, "Ana", "ana@example.com", "secret1");
    assert_eq!(first.status(), StatusCode::OK);

    let second = register!(app, "Ana again", "ANA@example.com", "secret2");
    assert_eq!(second.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(second).await;
    assert_eq!(body["error"], "email_exists");
}

#[actix_web::test]
async fn registration_validates_input() {
    let state = TestState::new();
    let app = app!(state);

    let resp = register!(app, "Ana", "not-an-email", "secret1");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = register!(app, "Ana", "ana@example.com", "123");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn login_failures_map_to_distinct_statuses() {
    let state = TestState::new();
    let app = app!(state);
    register!(app, "Ana", "ana@example.com", "secret1");

    let wrong_password = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "ana@example.com", "password": "nope-nope" }))
        .to_request();
    let resp = test::call_service(&app, wrong_password).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let unknown = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "bob@example.com", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, unknown).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn login_sets_cookie_that_authenticates_profile() {
    let state = TestState::new();
    let app = app!(state);
    register!(app, "Ana", "ana@example.com", "secret1");

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "ana@example.com", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "token")
        .expect("session cookie")
        .into_owned();
    assert_eq!(cookie.http_only(), Some(true));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["token"], cookie.value());

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .cookie(Cookie::new("token", cookie.value().to_string()))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["name"], "Ana");
    assert_eq!(profile["id"], body["id"]);
}

#[actix_web::test]
async fn profile_without_credential_is_null() {
    let state = TestState::new();
    let app = app!(state);

    let req = test::TestRequest::get().uri("/api/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body.is_null());

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .insert_header(bearer("garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_expires_the_cookie() {
    let state = TestState::new();
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::post().uri("/api/logout").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "token")
        .expect("cleared cookie")
        .into_owned();
    assert_eq!(cookie.value(), "");
}

#[actix_web::test]
async fn protected_routes_require_a_credential() {
    let state = TestState::new();
    let app = app!(state);

    for uri in ["/api/user-places", "/api/bookings"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let req = test::TestRequest::post()
        .uri("/api/places")
        .set_json(place_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn place_lifecycle_respects_ownership() {
    let state = TestState::new();
    let app = app!(state);
    let owner = sign_up!(app, "owner@example.com");
    let stranger = sign_up!(app, "stranger@example.com");

    let req = test::TestRequest::post()
        .uri("/api/places")
        .insert_header(bearer(&owner))
        .set_json(place_body())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["_id"].as_str().expect("place id").to_string();
    assert_eq!(created["maxGuests"], 4);
    assert_eq!(created["photos"], json!(["https://img.example/cabin.jpg"]));

    let req = test::TestRequest::put()
        .uri("/api/places")
        .insert_header(bearer(&stranger))
        .set_json(json!({ "id": id, "title": "Mine now" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri("/api/places")
        .insert_header(bearer(&owner))
        .set_json(json!({ "id": id, "title": "Lake cabin", "price": "150" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "ok": true }));

    let req = test::TestRequest::get().uri(&format!("/api/places/{}", id)).to_request();
    let place: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(place["title"], "Lake cabin");
    assert_eq!(place["price"], 150);
    assert_eq!(place["address"], "1 Shore Rd");

    let req = test::TestRequest::get()
        .uri("/api/user-places")
        .insert_header(bearer(&owner))
        .to_request();
    let mine: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));

    let req = test::TestRequest::get()
        .uri("/api/user-places")
        .insert_header(bearer(&stranger))
        .to_request();
    let theirs: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(theirs, json!([]));

    let all: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/places").to_request()).await;
    assert_eq!(all.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn unknown_or_malformed_place_ids_are_not_found() {
    let state = TestState::new();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/api/places/{}", uuid::Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/places/not-a-uuid").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn bookings_are_private_to_their_guest() {
    let state = TestState::new();
    let app = app!(state);
    let host = sign_up!(app, "host@example.com");
    let guest = sign_up!(app, "guest@example.com");
    let other = sign_up!(app, "other@example.com");

    let req = test::TestRequest::post()
        .uri("/api/places")
        .insert_header(bearer(&host))
        .set_json(place_body())
        .to_request();
    let place: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .insert_header(bearer(&guest))
        .set_json(json!({
            "place": place["_id"],
            "checkIn": "2026-07-01",
            "checkOut": "2026-07-04",
            "numberOfGuests": "2",
            "name": "Guest",
            "phone": "+1 555 123 4567"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let booking: Value = test::read_body_json(resp).await;
    assert_eq!(booking["price"], 360);

    let req = test::TestRequest::get()
        .uri("/api/bookings")
        .insert_header(bearer(&guest))
        .to_request();
    let mine: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["place"]["title"], "Cabin by the lake");

    let req = test::TestRequest::get()
        .uri("/api/bookings")
        .insert_header(bearer(&other))
        .to_request();
    let theirs: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(theirs, json!([]));
}

#[actix_web::test]
async fn booking_with_reversed_dates_is_rejected() {
    let state = TestState::new();
    let app = app!(state);
    let host = sign_up!(app, "host@example.com");

    let req = test::TestRequest::post()
        .uri("/api/places")
        .insert_header(bearer(&host))
        .set_json(place_body())
        .to_request();
    let place: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .insert_header(bearer(&host))
        .set_json(json!({
            "place": place["_id"],
            "checkIn": "2026-07-04",
            "checkOut": "2026-07-01",
            "numberOfGuests": 1,
            "name": "Host",
            "phone": "555 123 4567"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let state = TestState::new();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/upload-by-link")
        .insert_header((CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_body");
}

#[actix_web::test]
async fn incomplete_account_forms_are_unprocessable() {
    let state = TestState::new();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({ "name": "Ana", "email": "ana@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");

    let req = test::TestRequest::post()
        .uri("/api/register")
        .insert_header((CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "email": "ana@example.com", "password": 42 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn uploaded_photos_are_served_back() {
    let state = TestState::new();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header((CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY)))
        .set_payload(multipart_body(&[("photos", "tiny.png", b"not-really-a-png")]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let url = body["urls"][0].as_str().expect("stored url").to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".png"));

    let stored = test::call_and_read_body(&app, test::TestRequest::get().uri(&url).to_request()).await;
    assert_eq!(stored.as_ref(), b"not-really-a-png");
}

#[actix_web::test]
async fn oversize_photo_is_rejected() {
    let state = TestState::new();
    let app = app!(state);
    let big = vec![b'x'; MAX_FILE_SIZE + 1];

    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header((CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY)))
        .set_payload(multipart_body(&[("photos", "big.png", &big)]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_web::test]
async fn upload_by_link_rejects_non_http_links() {
    let state = TestState::new();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/upload-by-link")
        .set_json(json!({ "link": "ftp://example.com/photo.jpg" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
