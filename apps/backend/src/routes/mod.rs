use actix_web::web;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::middleware::AuthProtected;

pub mod auth;
pub mod events;
pub mod health;
pub mod tickets;

/// Malformed JSON bodies become Problem Details instead of actix's text/plain 400.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::bad_request(ErrorCode::BadRequest, format!("Invalid JSON body: {err}")).into()
    })
}

/// Register every route.
///
/// ```text
/// /health
/// /api
///   /auth      public
///   (gate)     AuthProtected
///     /event
///     /ticket
/// ```
///
/// The gated scope has an empty prefix, so any other `/api/*` path also
/// passes through the gate and is refused without a credential.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/health").configure(health::configure_routes));

    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .service(web::scope("/auth").configure(auth::configure_routes))
            .service(
                web::scope("")
                    .wrap(AuthProtected)
                    .service(web::scope("/event").configure(events::configure_routes))
                    .service(web::scope("/ticket").configure(tickets::configure_routes)),
            ),
    );
}
