/// HTTP middleware utilities for screening-service
use actix_cors::Cors;

use crate::config::CorsConfig;

/// CORS policy from the configured allow-list.
///
/// `*` allows any origin but never with credentials; credentialed requests
/// are only honoured for explicitly listed origins.
pub fn cors(config: &CorsConfig) -> Cors {
    let wildcard = config.allowed_origins.iter().any(|origin| origin == "*");

    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if wildcard {
        return cors.allow_any_origin();
    }

    for origin in &config.allowed_origins {
        cors = cors.allowed_origin(origin);
    }
    cors.supports_credentials()
}
