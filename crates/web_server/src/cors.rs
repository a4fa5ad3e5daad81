use actix_cors::Cors;

use crate::config::ServerConfig;

/// Returns true when a browser at `origin` may call the API with credentials.
pub fn origin_allowed(origin: &str, frontend_url: Option<&str>, suffix: &str) -> bool {
    if frontend_url.is_some_and(|frontend| frontend == origin) {
        return true;
    }
    !suffix.is_empty() && origin.ends_with(suffix)
}

/// Builds the CORS middleware. Requests without an `Origin` header are not
/// cross-origin and pass through untouched.
pub fn build_cors(config: &ServerConfig) -> Cors {
    let frontend_url = config.frontend_url.clone();
    let suffix = config.allowed_origin_suffix.clone();

    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            let allowed = origin
                .to_str()
                .map(|origin| origin_allowed(origin, frontend_url.as_deref(), &suffix))
                .unwrap_or(false);
            if !allowed {
                log::warn!("🚫 CORS rejected origin {:?}", origin);
            }
            allowed
        })
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
