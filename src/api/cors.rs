//! CORS layer built from the server config.

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use crate::config::ServerConfig;

/// CORS for the browser client.
///
/// Only the configured origins are allowed, with credentials.  Methods and
/// headers are mirrored from the preflight request, since a literal `*`
/// cannot be combined with credentials.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| {
            if *origin == "*" {
                log::warn!("ignoring wildcard CORS origin: credentials are enabled");
                return false;
            }
            !origin.is_empty()
        })
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
