use actix_cors::Cors;
use actix_web::http::header;

/// Build the CORS policy from the configured origin list.
///
/// Origins are validated when `EnvConfig` loads (no `*`, http(s) only), so
/// they are added verbatim. Credentials are allowed, which is why a wildcard
/// origin can never appear here.
pub fn cors_middleware(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "HEAD", "PUT", "DELETE", "PATCH"])
        // Headers the browser may send
        .allowed_headers(vec![
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        // Headers the browser is allowed to read from responses
        .expose_headers(vec![header::CONTENT_LENGTH])
        .supports_credentials()
        .max_age(3600);

    for origin in allowed_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
