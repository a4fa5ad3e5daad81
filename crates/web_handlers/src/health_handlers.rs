use actix_web::{HttpResponse, Result};

/// Plain-text liveness probe served at `/`
pub async fn root() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("🟢 API is up and running")
}

/// Minimal JSON probe used by the frontend
pub async fn api_test() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

/// Health check endpoint
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "service": "stayhub-api",
        "status": "healthy",
        "timestamp": chrono::Utc::now()
    })))
}
